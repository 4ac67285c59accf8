use async_trait::async_trait;
use std::sync::Arc;

use super::{Tool, ToolError};
use crate::llm::Generator;
use crate::prompts;

pub const METHODOLOGY: &str = "methodology";

/// Separates the topic from the gap in the tool input
pub const SEPARATOR: &str = "||";

/// Suggests a methodology, tools and a plan for a research gap
#[derive(Debug)]
pub struct MethodologyTool {
    generator: Arc<dyn Generator>,
}

impl MethodologyTool {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

/// Parse `topic||gap` into exactly two non-empty, trimmed parts
pub fn parse_topic_and_gap(input: &str) -> Result<(&str, &str), ToolError> {
    let parts: Vec<&str> = input.split(SEPARATOR).map(str::trim).collect();
    match parts.as_slice() {
        [topic, gap] if !topic.is_empty() && !gap.is_empty() => Ok((*topic, *gap)),
        _ => Err(ToolError::MalformedInput(format!(
            "expected 'topic{}gap' with both parts non-empty",
            SEPARATOR
        ))),
    }
}

#[async_trait]
impl Tool for MethodologyTool {
    fn name(&self) -> &str {
        METHODOLOGY
    }

    fn description(&self) -> &str {
        "Suggest a methodology, tools and datasets for a research gap. \
         Input: 'topic||gap'."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let (topic, gap) = parse_topic_and_gap(input)?;
        let prompt = prompts::methodology(topic, gap);
        Ok(self.generator.generate(&prompt).await?)
    }
}
