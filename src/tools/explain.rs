use async_trait::async_trait;
use std::sync::Arc;

use super::{require_input, Tool, ToolError};
use crate::llm::Generator;
use crate::prompts;

pub const EXPLAIN_TOPIC: &str = "explain_topic";

/// Beginner-friendly explanation of a research topic
#[derive(Debug)]
pub struct ExplainTopicTool {
    generator: Arc<dyn Generator>,
}

impl ExplainTopicTool {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Tool for ExplainTopicTool {
    fn name(&self) -> &str {
        EXPLAIN_TOPIC
    }

    fn description(&self) -> &str {
        "Explain a research topic in simple terms. Input: the topic."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let topic = require_input(input, "a topic")?;
        Ok(self.generator.generate(&prompts::explain_topic(&topic)).await?)
    }
}
