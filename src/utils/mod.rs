//! Utility modules supporting the clients and tools.
//!
//! - [`HttpClient`]: shared reqwest client with configured timeouts
//! - [`with_retry`]: run an upstream call with bounded exponential backoff
//! - [`extract_pages`]: page-by-page PDF text extraction
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use research_synth::utils::{with_retry, RetryConfig};
//! use research_synth::llm::GenerationError;
//!
//! # async fn call() -> Result<String, GenerationError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), GenerationError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let text = with_retry(config, || call()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod pdf;
mod retry;

pub use http::{HttpClient, USER_AGENT};
pub use pdf::{extract_pages, PdfExtractError};
pub use retry::{with_retry, RetryConfig, Retryable, TransientError};
