use async_trait::async_trait;
use std::sync::Arc;

use super::{require_input, Tool, ToolError};
use crate::models::{PaperRecord, SearchQuery};
use crate::sources::Source;

pub const PAPER_SEARCH: &str = "paper_search";

const TITLE_PREFIX: &str = "Title: ";

/// Searches the default source for a fixed number of papers
#[derive(Debug)]
pub struct PaperSearchTool {
    source: Arc<dyn Source>,
    max_results: usize,
    description: String,
}

impl PaperSearchTool {
    pub fn new(source: Arc<dyn Source>, max_results: usize) -> Self {
        let description = format!(
            "Search {} for the {} most relevant papers on a topic. Input: the topic.",
            source.name(),
            max_results
        );
        Self {
            source,
            max_results,
            description,
        }
    }
}

#[async_trait]
impl Tool for PaperSearchTool {
    fn name(&self) -> &str {
        PAPER_SEARCH
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let topic = require_input(input, "a search topic")?;
        let query = SearchQuery::new(topic.as_str()).max_results(self.max_results);
        let response = self.source.search(&query).await?;

        tracing::debug!(
            "{} returned {} papers for '{}'",
            response.source,
            response.len(),
            topic
        );

        if response.is_empty() {
            return Ok(format!("No papers found for '{}'.", topic));
        }
        Ok(format_papers(&response.papers))
    }
}

/// Render papers as `Title/Authors/Summary` blocks separated by a blank line
pub fn format_papers(papers: &[PaperRecord]) -> String {
    papers
        .iter()
        .map(|p| {
            format!(
                "{}{}\nAuthors: {}\nSummary: {}",
                TITLE_PREFIX,
                p.title,
                p.authors,
                p.summary.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split formatted search output back into one block per paper.
///
/// A block starts at each `Title: ` line, so blank lines inside a summary
/// do not break a paper apart.
pub fn split_paper_blocks(text: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    for line in text.lines() {
        if line.starts_with(TITLE_PREFIX) || blocks.is_empty() {
            blocks.push(line.to_string());
        } else if let Some(current) = blocks.last_mut() {
            current.push('\n');
            current.push_str(line);
        }
    }
    blocks
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| b.starts_with(TITLE_PREFIX))
        .collect()
}

/// Titles listed in formatted search output, in order
pub fn parse_titles(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.strip_prefix(TITLE_PREFIX))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}
