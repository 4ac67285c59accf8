//! Core data models for paper records and search operations.

mod paper;
mod search;

pub use paper::{PaperBuilder, PaperRecord, SourceType};
pub use search::{SearchQuery, SearchResponse};
