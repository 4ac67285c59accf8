use async_trait::async_trait;
use std::sync::Arc;

use super::{require_input, RegistryError, Tool, ToolError, ToolOutcome, ToolRegistry};
use crate::llm::Generator;
use crate::models::PaperRecord;
use crate::prompts;

pub const SUMMARIZE: &str = "summarize";

const UNTITLED: &str = "Untitled";

/// Extracts method, results and conclusion from a paper's summary
#[derive(Debug)]
pub struct SummarizeTool {
    generator: Arc<dyn Generator>,
}

impl SummarizeTool {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

/// Split tool input into `(title, summary)`.
///
/// A leading `Title:` line names the paper. An `Authors:` line is dropped
/// and a `Summary:` prefix is stripped, so a block from `paper_search` can
/// be passed through unchanged.
fn split_title(input: &str) -> (String, String) {
    let mut lines = input.lines().peekable();
    let title = match lines.peek().and_then(|l| l.trim().strip_prefix("Title:")) {
        Some(title) => {
            let title = title.trim().to_string();
            lines.next();
            title
        }
        None => String::new(),
    };

    let body = lines
        .filter(|l| !l.trim_start().starts_with("Authors:"))
        .map(|l| l.trim_start().strip_prefix("Summary:").unwrap_or(l).trim())
        .collect::<Vec<_>>()
        .join("\n");

    let title = if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    };
    (title, body.trim().to_string())
}

/// `summarize` input for one paper: a `Title:` line followed by its summary
pub fn summary_input(paper: &PaperRecord) -> String {
    format!("Title: {}\n{}", paper.title, paper.summary)
}

/// Summarize each paper in order, one `summarize` call per paper.
///
/// Failures stay per paper: each outcome carries its own error kind.
pub async fn summarize_each(
    tools: &ToolRegistry,
    papers: &[PaperRecord],
) -> Result<Vec<ToolOutcome>, RegistryError> {
    let mut outcomes = Vec::with_capacity(papers.len());
    for paper in papers {
        outcomes.push(tools.invoke(SUMMARIZE, &summary_input(paper)).await?);
    }
    Ok(outcomes)
}

#[async_trait]
impl Tool for SummarizeTool {
    fn name(&self) -> &str {
        SUMMARIZE
    }

    fn description(&self) -> &str {
        "Summarize one paper into method, results and conclusion. \
         Input: the paper's summary, optionally preceded by a 'Title: ...' line."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let input = require_input(input, "a paper summary")?;
        let (title, summary) = split_title(&input);
        if summary.is_empty() {
            return Err(ToolError::MalformedInput(
                "expected summary text after the title".to_string(),
            ));
        }

        let prompt = prompts::summarize_paper(&title, &summary);
        Ok(self.generator.generate(&prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockGenerator;

    #[test]
    fn test_split_title() {
        assert_eq!(
            split_title("Title: BERT\nAuthors: A, B\nSummary: Encoders."),
            ("BERT".to_string(), "Encoders.".to_string())
        );
        assert_eq!(
            split_title("Just an abstract."),
            ("Untitled".to_string(), "Just an abstract.".to_string())
        );
    }

    #[tokio::test]
    async fn test_summarize_uses_title_line() {
        let generator = Arc::new(MockGenerator::replying("**Method**: ..."));
        let tool = SummarizeTool::new(generator.clone());

        let text = tool
            .invoke("Title: Deep Residual Learning\nWe present a residual framework.")
            .await
            .unwrap();
        assert_eq!(text, "**Method**: ...");

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("Title: Deep Residual Learning"));
        assert!(prompt.contains("We present a residual framework."));
    }

    #[tokio::test]
    async fn test_summarize_each_requires_registered_tool() {
        let papers = vec![crate::sources::mock::make_paper("BERT", "Encoders.")];
        assert!(matches!(
            summarize_each(&ToolRegistry::new(), &papers).await,
            Err(RegistryError::UnknownTool(_))
        ));
    }

    #[tokio::test]
    async fn test_title_without_summary_rejected() {
        let tool = SummarizeTool::new(Arc::new(MockGenerator::replying("x")));
        assert!(matches!(
            tool.invoke("Title: Only a title").await,
            Err(ToolError::MalformedInput(_))
        ));
    }
}
