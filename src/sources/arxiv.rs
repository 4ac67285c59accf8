//! arXiv paper source implementation.

use async_trait::async_trait;
use chrono::SecondsFormat;
use feed_rs::parser;

use crate::config::Config;
use crate::models::{PaperBuilder, PaperRecord, SearchQuery, SearchResponse, SourceType};
use crate::sources::{Source, SourceCapabilities, SourceError};
use crate::utils::{with_retry, HttpClient, RetryConfig};

/// Default arXiv query endpoint
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv paper source
///
/// Supports a subject filter (sent upstream as a `cat:` clause) and an exact
/// year filter (applied locally to each entry's published timestamp).
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    base_url: String,
    retry: RetryConfig,
}

impl ArxivSource {
    /// Create a source against the given query endpoint
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Create from application configuration
    pub fn from_config(config: &Config, client: HttpClient) -> Self {
        Self::new(client, &config.sources.arxiv_url).with_retry(config.retry.to_retry_config())
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Build the `search_query` expression
    fn build_search_query(query: &SearchQuery) -> String {
        let mut parts = vec![format!("all:{}", query.query.trim())];

        if let Some(subject) = &query.subject {
            parts.push(format!("cat:{}", subject));
        }

        parts.join(" AND ")
    }

    fn build_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?search_query={}&start=0&max_results={}",
            self.base_url,
            urlencoding::encode(&Self::build_search_query(query)),
            query.max_results
        )
    }

    /// Parse one Atom entry, skipping entries without a title or id
    fn parse_entry(entry: &feed_rs::model::Entry) -> Option<PaperRecord> {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.as_str())
            .unwrap_or("");

        let summary = entry
            .summary
            .as_ref()
            .map(|s| s.content.as_str())
            .unwrap_or("");

        let mut builder = PaperBuilder::new(title, entry.id.as_str(), SourceType::Arxiv)
            .authors(entry.authors.iter().map(|a| a.name.as_str()))
            .summary(summary);

        if let Some(published) = entry.published {
            builder = builder.published(published.to_rfc3339_opts(SecondsFormat::Secs, true));
        }

        builder.build()
    }

    /// Parse a feed body and apply the year filter
    fn parse_feed(
        bytes: &[u8],
        year: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<PaperRecord>, SourceError> {
        let feed = parser::parse(bytes)
            .map_err(|e| SourceError::MalformedResponse(format!("Failed to parse Atom feed: {}", e)))?;

        let papers = feed
            .entries
            .iter()
            .filter_map(|entry| {
                let paper = Self::parse_entry(entry);
                if paper.is_none() {
                    tracing::debug!("Skipping arXiv entry without title or id: {}", entry.id);
                }
                paper
            })
            .filter(|paper| year.map_or(true, |y| paper.year() == Some(y)))
            .take(max_results)
            .collect();

        Ok(papers)
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
            | SourceCapabilities::SUBJECT_FILTER
            | SourceCapabilities::YEAR_FILTER
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        self.check_filters(query)?;
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("Empty search query".to_string()));
        }

        let url = self.build_url(query);
        tracing::debug!("Querying arXiv: {}", url);

        let client = &self.client;
        let url = url.as_str();
        let bytes = with_retry(self.retry, || async move {
            let response = client
                .get(url)
                .header("Accept", "application/atom+xml")
                .send()
                .await
                .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

            if !response.status().is_success() {
                return Err(SourceError::UpstreamUnavailable {
                    source_name: "arXiv".to_string(),
                    status: response.status().as_u16(),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
        })
        .await?;

        let papers = Self::parse_feed(bytes.as_ref(), query.year.as_deref(), query.max_results)?;
        tracing::debug!("arXiv returned {} papers for '{}'", papers.len(), query.query);

        Ok(SearchResponse::new(papers, "arXiv", &query.query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query Results</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/abs/2301.00001v1</id>
    <title>Sparse
      Transformers Revisited</title>
    <summary>We revisit sparse attention.</summary>
    <published>2023-01-02T10:00:00Z</published>
    <updated>2023-01-02T10:00:00Z</updated>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2201.00002v2</id>
    <title>Linear Attention at Scale</title>
    <summary>Linear attention scales.</summary>
    <published>2022-01-05T10:00:00Z</published>
    <updated>2022-01-05T10:00:00Z</updated>
    <author><name>Grace Hopper</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2305.00003v1</id>
    <title>Mixture of Experts</title>
    <summary></summary>
    <published>2023-05-09T10:00:00Z</published>
    <updated>2023-05-09T10:00:00Z</updated>
    <author><name>Claude Shannon</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_build_search_query() {
        let query = SearchQuery::new("transformers");
        assert_eq!(ArxivSource::build_search_query(&query), "all:transformers");

        let query = SearchQuery::new("transformers").subject("cs.CL");
        assert_eq!(
            ArxivSource::build_search_query(&query),
            "all:transformers AND cat:cs.CL"
        );
    }

    #[test]
    fn test_build_url_has_fixed_start() {
        let source = ArxivSource::new(HttpClient::new().unwrap(), ARXIV_API_URL);
        let url = source.build_url(&SearchQuery::new("graph nets").max_results(7));
        assert!(url.starts_with(ARXIV_API_URL));
        assert!(url.contains("search_query=all%3Agraph%20nets"));
        assert!(url.contains("&start=0&max_results=7"));
    }

    #[test]
    fn test_parse_feed_normalizes_entries() {
        let papers = ArxivSource::parse_feed(FEED.as_bytes(), None, 10).unwrap();
        assert_eq!(papers.len(), 3);

        let first = &papers[0];
        assert_eq!(first.title, "Sparse Transformers Revisited");
        assert_eq!(first.authors, "Ada Lovelace, Alan Turing");
        assert_eq!(first.summary, "We revisit sparse attention.");
        assert_eq!(first.link, "http://arxiv.org/abs/2301.00001v1");
        assert_eq!(first.published.as_deref(), Some("2023-01-02T10:00:00Z"));
        assert_eq!(first.year(), Some("2023"));
        assert_eq!(papers[2].summary, "");
    }

    #[test]
    fn test_year_filter_is_exact_match() {
        let all = ArxivSource::parse_feed(FEED.as_bytes(), None, 10).unwrap();
        let only_2023 = ArxivSource::parse_feed(FEED.as_bytes(), Some("2023"), 10).unwrap();
        let none = ArxivSource::parse_feed(FEED.as_bytes(), Some("1999"), 10).unwrap();

        assert_eq!(only_2023.len(), 2);
        assert!(only_2023.iter().all(|p| p.year() == Some("2023")));
        assert!(all.len() >= only_2023.len());
        assert!(none.is_empty());
    }

    #[test]
    fn test_parse_feed_respects_max_results() {
        let papers = ArxivSource::parse_feed(FEED.as_bytes(), None, 2).unwrap();
        assert_eq!(papers.len(), 2);
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        let result = ArxivSource::parse_feed(b"not xml", None, 5);
        assert!(matches!(result, Err(SourceError::MalformedResponse(_))));
    }
}
