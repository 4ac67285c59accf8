//! Generation client: prompt in, completion text out.
//!
//! [`Generator`] is the typed seam. Tools keep the typed error and let
//! [`crate::tools::ToolRegistry::invoke`] turn it into text; callers
//! outside the tool layer that want text either way can use
//! [`generate_text`], which renders a failure as its user-facing message.

mod gemini;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::MockGenerator;

use async_trait::async_trait;

use crate::utils::{Retryable, TransientError};

/// A generative-language backend
#[async_trait]
pub trait Generator: Send + Sync + std::fmt::Debug {
    /// Send one prompt and return the completion text.
    ///
    /// Every call is a fresh round-trip; identical prompts are not cached.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Errors raised by a [`Generator`]
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Upstream answered with a non-success status
    #[error("Gemini API failed ({status})")]
    UpstreamUnavailable { status: u16 },

    /// Network or transport error
    #[error("Error: {0}")]
    Network(String),

    /// Success status but no completion text in the body
    #[error("Failed to parse Gemini response: {0}")]
    MalformedResponse(String),

    /// No API key configured
    #[error("Gemini API key is not configured (set GEMINI_API_KEY)")]
    MissingApiKey,
}

impl Retryable for GenerationError {
    fn transient(&self) -> Option<TransientError> {
        match self {
            GenerationError::Network(_) => Some(TransientError::Network),
            GenerationError::UpstreamUnavailable { status } => TransientError::from_status(*status),
            _ => None,
        }
    }
}

/// Generate, rendering any failure as its user-facing message
pub async fn generate_text(generator: &dyn Generator, prompt: &str) -> String {
    match generator.generate(prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Generation failed: {}", e);
            e.to_string()
        }
    }
}
