//! Search request and response models.

use serde::{Deserialize, Serialize};

use super::PaperRecord;

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search query string
    pub query: String,

    /// Maximum number of results to return
    pub max_results: usize,

    /// Subject/category filter (e.g. "cs.AI")
    pub subject: Option<String>,

    /// Exact publication year filter (e.g. "2023")
    pub year: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: 5,
            subject: None,
            year: None,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Set subject filter; blank values clear it
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = non_blank(subject.into());
        self
    }

    /// Set year filter; blank values clear it
    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = non_blank(year.into());
        self
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Search response containing papers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// List of papers found
    pub papers: Vec<PaperRecord>,

    /// Source that returned these results
    pub source: String,

    /// Original query
    pub query: String,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(papers: Vec<PaperRecord>, source: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            papers,
            source: source.into(),
            query: query.into(),
        }
    }

    /// Number of papers returned
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Whether no papers were returned
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_builder() {
        let query = SearchQuery::new("graph neural networks")
            .max_results(12)
            .subject("cs.LG")
            .year("2021");

        assert_eq!(query.query, "graph neural networks");
        assert_eq!(query.max_results, 12);
        assert_eq!(query.subject.as_deref(), Some("cs.LG"));
        assert_eq!(query.year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_blank_filters_are_dropped() {
        let query = SearchQuery::new("x").subject("").year("  ");
        assert!(query.subject.is_none());
        assert!(query.year.is_none());
    }
}
