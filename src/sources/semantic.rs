//! Semantic Scholar paper source implementation.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{PaperBuilder, PaperRecord, SearchQuery, SearchResponse, SourceType};
use crate::sources::{Source, SourceCapabilities, SourceError};
use crate::utils::{with_retry, HttpClient, RetryConfig};

/// Default Semantic Scholar graph API base
pub const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

const SEARCH_FIELDS: &str = "title,authors,abstract,url";
const NO_ABSTRACT: &str = "No abstract available.";

/// Semantic Scholar paper source
///
/// Takes a flat result count only; subject and year filters are rejected.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
    retry: RetryConfig,
}

impl SemanticScholarSource {
    /// Create a source against the given API base
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Create from application configuration
    pub fn from_config(config: &Config, client: HttpClient) -> Self {
        Self::new(client, &config.sources.semantic_url).with_retry(config.retry.to_retry_config())
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn build_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/paper/search?query={}&limit={}&fields={}",
            self.base_url,
            urlencoding::encode(query.query.trim()),
            query.max_results,
            SEARCH_FIELDS
        )
    }

    /// Parse Semantic Scholar paper data
    fn parse_paper(data: S2Paper) -> Option<PaperRecord> {
        let link = data
            .url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| {
                data.paper_id
                    .as_ref()
                    .map(|id| format!("https://www.semanticscholar.org/paper/{}", id))
            })
            .unwrap_or_default();

        let summary = data
            .r#abstract
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| NO_ABSTRACT.to_string());

        PaperBuilder::new(data.title.unwrap_or_default(), link, SourceType::SemanticScholar)
            .authors(data.authors.iter().filter_map(|a| a.name.as_deref()))
            .summary(summary)
            .build()
    }
}

#[async_trait]
impl Source for SemanticScholarSource {
    fn id(&self) -> &str {
        "semantic"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        self.check_filters(query)?;
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("Empty search query".to_string()));
        }

        let url = self.build_url(query);
        tracing::debug!("Querying Semantic Scholar: {}", url);

        let client = &self.client;
        let url = url.as_str();
        let data: S2SearchResponse = with_retry(self.retry, || async move {
            let response = client.get(url).send().await.map_err(|e| {
                SourceError::Network(format!("Failed to search Semantic Scholar: {}", e))
            })?;

            if !response.status().is_success() {
                return Err(SourceError::UpstreamUnavailable {
                    source_name: "Semantic Scholar".to_string(),
                    status: response.status().as_u16(),
                });
            }

            response
                .json::<S2SearchResponse>()
                .await
                .map_err(|e| SourceError::MalformedResponse(format!("Failed to parse JSON: {}", e)))
        })
        .await?;

        let papers: Vec<PaperRecord> = data
            .data
            .into_iter()
            .filter_map(Self::parse_paper)
            .take(query.max_results)
            .collect();

        Ok(SearchResponse::new(papers, "Semantic Scholar", &query.query))
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct S2Paper {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
    r#abstract: Option<String>,
    #[serde(default)]
    authors: Vec<S2Author>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default)]
    data: Vec<S2Paper>,
}
