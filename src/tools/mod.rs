//! Capability tools available to the research agent.
//!
//! A tool is a named text-in/text-out operation. Internally each tool
//! returns `Result<String, ToolError>`; [`ToolRegistry::invoke`] turns a
//! failure into descriptive text so the agent always has something to
//! reason over, while [`ToolOutcome::error`] keeps the typed kind around
//! for callers that need to tell success from an error message.

mod document_reader;
mod explain;
mod gap_analysis;
mod methodology;
mod paper_search;
mod summarize;

pub use document_reader::{
    truncate_text, DocumentReaderTool, PdfTextExtractor, TextExtractor, DOCUMENT_READER,
};
pub use explain::{ExplainTopicTool, EXPLAIN_TOPIC};
pub use gap_analysis::{GapAnalysisTool, GAP_ANALYSIS};
pub use methodology::{parse_topic_and_gap, MethodologyTool, METHODOLOGY, SEPARATOR};
pub use paper_search::{format_papers, parse_titles, split_paper_blocks, PaperSearchTool, PAPER_SEARCH};
pub use summarize::{summarize_each, summary_input, SummarizeTool, SUMMARIZE};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::llm::{GenerationError, Generator};
use crate::sources::{Source, SourceError};

/// A named, independently invocable capability
#[async_trait]
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// Unique name the agent selects the tool by
    fn name(&self) -> &str;

    /// What the tool does and what input it expects
    fn description(&self) -> &str;

    /// Run the tool on its text input
    async fn invoke(&self, input: &str) -> Result<String, ToolError>;
}

/// Errors a tool can report
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The input violates the tool's contract
    #[error("Invalid input: {0}")]
    MalformedInput(String),

    /// A document could not be opened or had no extractable text
    #[error("Failed to read PDF: {0}")]
    DocumentUnreadable(String),
}

/// Coarse classification of a tool failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    UpstreamUnavailable,
    MalformedResponse,
    MalformedInput,
    DocumentUnreadable,
}

impl ToolError {
    /// Classify this error
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            ToolError::Source(SourceError::MalformedResponse(_))
            | ToolError::Generation(GenerationError::MalformedResponse(_)) => {
                ToolErrorKind::MalformedResponse
            }
            ToolError::Source(SourceError::UnsupportedFilter { .. })
            | ToolError::Source(SourceError::InvalidRequest(_))
            | ToolError::MalformedInput(_) => ToolErrorKind::MalformedInput,
            ToolError::Source(_) | ToolError::Generation(_) => ToolErrorKind::UpstreamUnavailable,
            ToolError::DocumentUnreadable(_) => ToolErrorKind::DocumentUnreadable,
        }
    }
}

/// Text produced by one invocation, plus the error kind when it failed
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub text: String,
    pub error: Option<ToolErrorKind>,
}

impl ToolOutcome {
    /// Whether the tool succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Tool '{0}' not found")]
    UnknownTool(String),
}

/// Closure-backed tool, for ad hoc capabilities
#[derive(Clone)]
pub struct FnTool {
    name: String,
    description: String,
    func: Arc<dyn Fn(&str) -> Result<String, ToolError> + Send + Sync>,
}

impl FnTool {
    /// Wrap a synchronous function as a tool
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            func: Arc::new(func),
        }
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        (self.func)(input)
    }
}

/// Ordered collection of uniquely named tools
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every research tool.
    ///
    /// `paper_search` uses `source`; the model-backed tools share `generator`.
    pub fn research_tools(
        config: &Config,
        source: Arc<dyn Source>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Arc::new(PaperSearchTool::new(
            source,
            config.sources.search_results,
        )))?;
        registry.register(Arc::new(SummarizeTool::new(generator.clone())))?;
        registry.register(Arc::new(GapAnalysisTool::new(generator.clone())))?;
        registry.register(Arc::new(MethodologyTool::new(generator.clone())))?;
        registry.register(Arc::new(DocumentReaderTool::new(config.documents.max_chars)))?;
        registry.register(Arc::new(ExplainTopicTool::new(generator)))?;
        Ok(registry)
    }

    /// Register a tool; names must be unique
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Whether a tool with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tools in registration order
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name.
    ///
    /// Only an unknown name is an error; tool failures come back as text
    /// with [`ToolOutcome::error`] set.
    pub async fn invoke(&self, name: &str, input: &str) -> Result<ToolOutcome, RegistryError> {
        let tool = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))?;

        tracing::info!("Invoking tool {}", name);
        match tool.invoke(input).await {
            Ok(text) => Ok(ToolOutcome { text, error: None }),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                Ok(ToolOutcome {
                    text: e.to_string(),
                    error: Some(e.kind()),
                })
            }
        }
    }
}

/// Shared input check: tools reject blank input up front
pub(crate) fn require_input(input: &str, what: &str) -> Result<String, ToolError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ToolError::MalformedInput(format!("expected {}", what)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(name: &str) -> Arc<dyn Tool> {
        Arc::new(FnTool::new(name, "echo", |input| Ok(input.to_string())))
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("a")).unwrap();
        registry.register(echo("b")).unwrap();
        assert!(matches!(
            registry.register(echo("a")),
            Err(RegistryError::DuplicateTool(name)) if name == "a"
        ));
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_invoke_turns_failures_into_text() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(FnTool::new("broken", "fails", |_| {
                Err(ToolError::MalformedInput("nope".to_string()))
            })))
            .unwrap();

        let outcome = registry.invoke("broken", "x").await.unwrap();
        assert_eq!(outcome.text, "Invalid input: nope");
        assert_eq!(outcome.error, Some(ToolErrorKind::MalformedInput));
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = ToolRegistry::new();
        assert!(matches!(
            registry.invoke("missing", "x").await,
            Err(RegistryError::UnknownTool(_))
        ));
    }

    #[test]
    fn test_error_kinds() {
        let upstream = ToolError::from(GenerationError::UpstreamUnavailable { status: 503 });
        assert_eq!(upstream.kind(), ToolErrorKind::UpstreamUnavailable);
        assert_eq!(upstream.to_string(), "Gemini API failed (503)");

        let malformed = ToolError::from(SourceError::MalformedResponse("bad".to_string()));
        assert_eq!(malformed.kind(), ToolErrorKind::MalformedResponse);

        let filter = ToolError::from(SourceError::UnsupportedFilter {
            source_name: "Semantic Scholar".to_string(),
            filter: "year",
        });
        assert_eq!(filter.kind(), ToolErrorKind::MalformedInput);
    }

    #[test]
    fn test_research_tools_are_registered_in_order() {
        let registry = ToolRegistry::research_tools(
            &Config::default(),
            Arc::new(crate::sources::MockSource::new()),
            Arc::new(crate::llm::MockGenerator::replying("ok")),
        )
        .unwrap();

        assert_eq!(
            registry.names(),
            vec![
                PAPER_SEARCH,
                SUMMARIZE,
                GAP_ANALYSIS,
                METHODOLOGY,
                DOCUMENT_READER,
                EXPLAIN_TOPIC
            ]
        );
    }
}
