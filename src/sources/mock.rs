//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{PaperBuilder, PaperRecord, SearchQuery, SearchResponse, SourceType};
use crate::sources::{Source, SourceCapabilities, SourceError};

/// A mock source that returns predefined papers and records every query.
#[derive(Debug, Default)]
pub struct MockSource {
    papers: Mutex<Vec<PaperRecord>>,
    failure: Mutex<Option<u16>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockSource {
    /// Create a new mock source with no papers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source returning the given papers.
    pub fn with_papers(papers: Vec<PaperRecord>) -> Self {
        let source = Self::new();
        source.set_papers(papers);
        source
    }

    /// Set the papers to return.
    pub fn set_papers(&self, papers: Vec<PaperRecord>) {
        *self.papers.lock().unwrap_or_else(|e| e.into_inner()) = papers;
    }

    /// Make every search fail with the given HTTP status.
    pub fn fail_with_status(&self, status: u16) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(status);
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query.clone());
        self.check_filters(query)?;

        if let Some(status) = *self.failure.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(SourceError::UpstreamUnavailable {
                source_name: self.name().to_string(),
                status,
            });
        }

        let papers = self
            .papers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .take(query.max_results)
            .cloned()
            .collect();

        Ok(SearchResponse::new(papers, self.name(), &query.query))
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(title: &str, summary: &str) -> PaperRecord {
    let slug: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();

    PaperBuilder::new(
        title,
        format!("http://example.com/{}", slug),
        SourceType::Other("mock".to_string()),
    )
    .authors(["Test Author"])
    .summary(summary)
    .build()
    .unwrap_or_else(|| PaperRecord {
        title: "Untitled".to_string(),
        authors: String::new(),
        summary: summary.to_string(),
        link: "http://example.com/untitled".to_string(),
        published: None,
        source: SourceType::Other("mock".to_string()),
    })
}
