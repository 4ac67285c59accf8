use async_trait::async_trait;
use std::sync::Arc;

use super::{require_input, Tool, ToolError};
use crate::llm::Generator;
use crate::prompts;

pub const GAP_ANALYSIS: &str = "gap_analysis";

/// Identifies the research gap shared by several paper summaries
#[derive(Debug)]
pub struct GapAnalysisTool {
    generator: Arc<dyn Generator>,
}

impl GapAnalysisTool {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Tool for GapAnalysisTool {
    fn name(&self) -> &str {
        GAP_ANALYSIS
    }

    fn description(&self) -> &str {
        "Find the common research gap across papers. \
         Input: paper summaries separated by blank lines."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let input = require_input(input, "paper summaries separated by blank lines")?;
        let papers: Vec<(&str, &str)> = input
            .split("\n\n")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|summary| ("", summary))
            .collect();

        tracing::debug!("Analyzing gap across {} summaries", papers.len());
        let prompt = prompts::research_gap(&papers);
        Ok(self.generator.generate(&prompt).await?)
    }
}
