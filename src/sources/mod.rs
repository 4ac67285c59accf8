//! Paper source plugins with a trait-based architecture.
//!
//! Every source implements [`Source`] and normalizes its results into
//! [`PaperRecord`](crate::models::PaperRecord)s, so callers can treat
//! providers interchangeably. Sources differ in which filters they honor;
//! they declare that through [`SourceCapabilities`] and reject queries
//! carrying a filter they cannot apply instead of silently dropping it.
//!
//! Two sources ship:
//!
//! - `arxiv` - arXiv Atom API, supports subject and exact-year filters
//! - `semantic` - Semantic Scholar graph API, flat result count only

mod arxiv;
pub mod mock;
mod registry;
mod semantic;

pub use arxiv::ArxivSource;
pub use mock::MockSource;
pub use registry::{SourceCapabilities, SourceRegistry};
pub use semantic::SemanticScholarSource;

use crate::models::{SearchQuery, SearchResponse};
use crate::utils::{Retryable, TransientError};
use async_trait::async_trait;

/// The Source trait defines the interface for all paper source plugins.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "arxiv", "semantic")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Describe the capabilities of this source
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    /// Whether this source can restrict results to a subject/category
    fn supports_subject_filter(&self) -> bool {
        self.capabilities()
            .contains(SourceCapabilities::SUBJECT_FILTER)
    }

    /// Whether this source can restrict results to a publication year
    fn supports_year_filter(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::YEAR_FILTER)
    }

    /// Reject a query that carries filters this source cannot honor
    fn check_filters(&self, query: &SearchQuery) -> Result<(), SourceError> {
        if query.subject.is_some() && !self.supports_subject_filter() {
            return Err(SourceError::UnsupportedFilter {
                source_name: self.name().to_string(),
                filter: "subject",
            });
        }
        if query.year.is_some() && !self.supports_year_filter() {
            return Err(SourceError::UnsupportedFilter {
                source_name: self.name().to_string(),
                filter: "year",
            });
        }
        Ok(())
    }

    /// Search for papers matching the query.
    ///
    /// Returns at most `query.max_results` records. Returning fewer is not
    /// an error.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Upstream answered with a non-success status
    #[error("{source_name} API failed ({status})")]
    UpstreamUnavailable { source_name: String, status: u16 },

    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Success status but the body could not be understood
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The query carries a filter this source cannot apply
    #[error("{source_name} does not support the {filter} filter")]
    UnsupportedFilter {
        source_name: String,
        filter: &'static str,
    },

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown source id
    #[error("Source not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::MalformedResponse(format!("JSON: {}", err))
    }
}

impl Retryable for SourceError {
    fn transient(&self) -> Option<TransientError> {
        match self {
            SourceError::Network(_) => Some(TransientError::Network),
            SourceError::UpstreamUnavailable { status, .. } => TransientError::from_status(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_capabilities() {
        let caps = SourceCapabilities::SEARCH | SourceCapabilities::YEAR_FILTER;

        assert!(caps.contains(SourceCapabilities::SEARCH));
        assert!(caps.contains(SourceCapabilities::YEAR_FILTER));
        assert!(!caps.contains(SourceCapabilities::SUBJECT_FILTER));
    }

    #[test]
    fn test_upstream_error_message_carries_status() {
        let err = SourceError::UpstreamUnavailable {
            source_name: "arXiv".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "arXiv API failed (503)");
        assert_eq!(err.transient(), Some(TransientError::ServerError));
    }

    #[test]
    fn test_filter_check_uses_capabilities() {
        let source = MockSource::new();
        assert!(source.check_filters(&SearchQuery::new("x")).is_ok());
        let err = source
            .check_filters(&SearchQuery::new("x").year("2020"))
            .unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFilter { filter: "year", .. }));
    }
}
