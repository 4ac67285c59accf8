//! # Research Synth
//!
//! A research assistant that searches paper repositories, asks a
//! generative model to summarize and critique what it finds, and chains
//! those capabilities through a tool-orchestrating agent.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (PaperRecord, SearchQuery, etc.)
//! - [`sources`]: Paper sources (arXiv, Semantic Scholar) behind one trait
//! - [`llm`]: Generation client for the Gemini API
//! - [`prompts`]: Instruction templates sent to the model
//! - [`tools`]: Named text-in/text-out capabilities and their registry
//! - [`agent`]: The loop that decides which tool to call next
//! - [`utils`]: HTTP client, retry and PDF extraction
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal output helpers for the binary

pub mod agent;
pub mod config;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod sources;
pub mod tools;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use agent::{Agent, AgentError, AgentResponse};
pub use config::Config;
pub use models::{PaperRecord, SearchQuery};
pub use sources::{Source, SourceRegistry};
pub use tools::{Tool, ToolRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
