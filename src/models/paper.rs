//! Paper record normalized from any paper source.

use serde::{Deserialize, Serialize};

/// The repository a paper record came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Arxiv,
    SemanticScholar,
    #[serde(untagged)]
    Other(String),
}

impl SourceType {
    /// Returns the display name of the source
    pub fn name(&self) -> &str {
        match self {
            SourceType::Arxiv => "arXiv",
            SourceType::SemanticScholar => "Semantic Scholar",
            SourceType::Other(s) => s,
        }
    }

    /// Returns the source identifier used for selection
    pub fn id(&self) -> &str {
        match self {
            SourceType::Arxiv => "arxiv",
            SourceType::SemanticScholar => "semantic",
            SourceType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One search result, in the shape every source normalizes to.
///
/// A record always carries a non-empty title and link. Build it through
/// [`PaperBuilder::build`], which enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Paper title
    pub title: String,

    /// Authors (comma-separated)
    pub authors: String,

    /// Abstract text, may be empty
    pub summary: String,

    /// Landing page URL
    pub link: String,

    /// Publication timestamp as reported upstream
    pub published: Option<String>,

    /// Source where the paper was found
    pub source: SourceType,
}

impl PaperRecord {
    /// Publication year, taken from the first four characters of the timestamp
    pub fn year(&self) -> Option<&str> {
        self.published
            .as_deref()
            .and_then(|p| p.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Builder for constructing [`PaperRecord`]s
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: PaperRecord,
}

impl PaperBuilder {
    /// Create a new builder with the required fields
    pub fn new(title: impl Into<String>, link: impl Into<String>, source: SourceType) -> Self {
        Self {
            paper: PaperRecord {
                title: title.into(),
                authors: String::new(),
                summary: String::new(),
                link: link.into(),
                published: None,
                source,
            },
        }
    }

    /// Set authors from a list of names
    pub fn authors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.paper.authors = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        self
    }

    /// Set abstract
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.paper.summary = summary.into();
        self
    }

    /// Set publication timestamp
    pub fn published(mut self, published: impl Into<String>) -> Self {
        self.paper.published = Some(published.into());
        self
    }

    /// Build the record, or `None` when the title or link is blank
    pub fn build(self) -> Option<PaperRecord> {
        let mut paper = self.paper;
        paper.title = collapse_whitespace(&paper.title);
        paper.link = paper.link.trim().to_string();
        paper.summary = paper.summary.trim().to_string();

        if paper.title.is_empty() || paper.link.is_empty() {
            return None;
        }
        Some(paper)
    }
}

/// Feed titles arrive wrapped across lines; fold them back onto one.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
