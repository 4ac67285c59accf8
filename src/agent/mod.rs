//! Tool-orchestrating research agent.
//!
//! The agent answers one free-text request at a time. Each iteration asks a
//! [`DecisionStep`] for the next move: either invoke a registered tool and
//! record its output as a tool turn, or finish with an answer. Tool
//! failures arrive as text and never abort the loop; the only hard stop is
//! running out of iterations.
//!
//! ```text
//! AwaitingInput -> Deciding -> Invoking -> Deciding -> ... -> Responding -> AwaitingInput
//! ```

pub mod decision;
pub mod memory;

pub use decision::{
    parse_react, Decision, DecisionContext, DecisionError, DecisionStep, KeywordPlanner,
    LlmDecider, Observation,
};
pub use memory::{MemoryPolicy, Role, Transcript, Turn};

use serde::Serialize;
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::tools::{ToolErrorKind, ToolRegistry};

/// Observable phase of the agent loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    AwaitingInput,
    Deciding,
    Invoking,
    Responding,
}

/// One tool call made while answering a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub input: String,
    pub output: String,
    /// Set when `output` is an error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolErrorKind>,
}

impl ToolInvocation {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one request
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub answer: String,
    pub invocations: Vec<ToolInvocation>,
    /// Decisions taken, including the final one
    pub iterations: usize,
}

/// Errors that end a request
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Agent stopped after {limit} iterations without a final answer")]
    IterationLimitExceeded { limit: usize },

    #[error("Decision step failed: {0}")]
    Decision(#[from] DecisionError),
}

/// The research agent
#[derive(Debug)]
pub struct Agent {
    tools: Arc<ToolRegistry>,
    decider: Box<dyn DecisionStep>,
    transcript: Transcript,
    memory: Option<MemoryPolicy>,
    max_iterations: usize,
    state: AgentState,
}

impl Agent {
    /// Create an agent without memory and with the default iteration bound
    pub fn new(tools: Arc<ToolRegistry>, decider: Box<dyn DecisionStep>) -> Self {
        Self::from_config(
            &AgentConfig {
                memory: false,
                ..AgentConfig::default()
            },
            tools,
            decider,
        )
    }

    pub fn from_config(
        config: &AgentConfig,
        tools: Arc<ToolRegistry>,
        decider: Box<dyn DecisionStep>,
    ) -> Self {
        Self {
            tools,
            decider,
            transcript: Transcript::new(),
            memory: config.memory.then(|| MemoryPolicy::from_config(config)),
            max_iterations: config.max_iterations,
            state: AgentState::AwaitingInput,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Carry the transcript across requests, bounded by `policy`
    pub fn with_memory(mut self, policy: MemoryPolicy) -> Self {
        self.memory = Some(policy);
        self
    }

    pub fn without_memory(mut self) -> Self {
        self.memory = None;
        self
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn has_memory(&self) -> bool {
        self.memory.is_some()
    }

    /// Forget the conversation
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.state = AgentState::AwaitingInput;
    }

    fn set_state(&mut self, state: AgentState) {
        tracing::debug!("Agent state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Answer one request
    pub async fn run(&mut self, request: &str) -> Result<AgentResponse, AgentError> {
        match self.memory {
            Some(policy) => {
                policy.enforce(&mut self.transcript);
            }
            None => self.transcript.clear(),
        }
        self.transcript.push(Turn::user(request));

        let mut invocations = Vec::new();
        for iteration in 1..=self.max_iterations {
            self.set_state(AgentState::Deciding);
            let decision = {
                let context = DecisionContext {
                    request,
                    transcript: &self.transcript,
                    tools: &self.tools,
                };
                self.decider.decide(&context).await
            };

            let decision = match decision {
                Ok(decision) => decision,
                Err(e) => {
                    tracing::warn!("Decision step failed: {}", e);
                    self.set_state(AgentState::AwaitingInput);
                    return Err(e.into());
                }
            };

            match decision {
                Decision::Finish(answer) => {
                    self.set_state(AgentState::Responding);
                    self.transcript.push(Turn::agent(answer.as_str()));
                    self.set_state(AgentState::AwaitingInput);
                    return Ok(AgentResponse {
                        answer,
                        invocations,
                        iterations: iteration,
                    });
                }
                Decision::UseTool { tool, input } => {
                    if !self.tools.contains(&tool) {
                        tracing::warn!("Decision named unknown tool '{}'", tool);
                        let message = format!(
                            "Unknown tool '{}'. Available tools: {}",
                            tool,
                            self.tools.names().join(", ")
                        );
                        let kind = Some(ToolErrorKind::MalformedInput);
                        self.transcript.push(Turn::tool(tool, message).with_error(kind));
                        continue;
                    }

                    self.set_state(AgentState::Invoking);
                    let (output, error) = match self.tools.invoke(&tool, &input).await {
                        Ok(outcome) => (outcome.text, outcome.error),
                        Err(e) => (e.to_string(), Some(ToolErrorKind::MalformedInput)),
                    };
                    self.transcript
                        .push(Turn::tool(tool.as_str(), output.as_str()).with_error(error));
                    invocations.push(ToolInvocation {
                        tool,
                        input,
                        output,
                        error,
                    });
                }
            }
        }

        tracing::warn!("Iteration limit {} reached", self.max_iterations);
        self.set_state(AgentState::AwaitingInput);
        Err(AgentError::IterationLimitExceeded {
            limit: self.max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FnTool, Tool, ToolError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Scripted(Mutex<VecDeque<Decision>>);

    impl Scripted {
        fn boxed(decisions: Vec<Decision>) -> Box<dyn DecisionStep> {
            Box::new(Self(Mutex::new(decisions.into())))
        }
    }

    #[async_trait]
    impl DecisionStep for Scripted {
        async fn decide(&self, _: &DecisionContext<'_>) -> Result<Decision, DecisionError> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Decision::use_tool("echo", "again")))
        }
    }

    fn registry(calls: Arc<AtomicUsize>) -> Arc<ToolRegistry> {
        let mut tools = ToolRegistry::new();
        let echo: Arc<dyn Tool> = Arc::new(FnTool::new("echo", "echo", move |input| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("echo: {}", input))
        }));
        tools.register(echo).unwrap();
        tools
            .register(Arc::new(FnTool::new("fail", "fails", |_| {
                Err(ToolError::DocumentUnreadable("no readable text".to_string()))
            })))
            .unwrap();
        Arc::new(tools)
    }

    #[tokio::test]
    async fn test_tool_then_finish() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut agent = Agent::new(
            registry(calls.clone()),
            Scripted::boxed(vec![
                Decision::use_tool("echo", "hi"),
                Decision::Finish("done".to_string()),
            ]),
        );

        let response = agent.run("say hi").await.unwrap();
        assert_eq!(response.answer, "done");
        assert_eq!(response.iterations, 2);
        assert_eq!(response.invocations.len(), 1);
        assert_eq!(response.invocations[0].output, "echo: hi");
        assert!(response.invocations[0].is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(agent.state(), AgentState::AwaitingInput);

        let roles: Vec<Role> = agent.transcript().turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Tool, Role::Agent]);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut agent = Agent::new(
            registry(calls.clone()),
            Scripted::boxed(vec![
                Decision::use_tool("web_browse", "x"),
                Decision::Finish("gave up".to_string()),
            ]),
        );

        let response = agent.run("browse").await.unwrap();
        assert!(response.invocations.is_empty());
        assert_eq!(response.iterations, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let notice = &agent.transcript().turns()[1];
        assert_eq!(notice.role, Role::Tool);
        assert_eq!(notice.content, "Unknown tool 'web_browse'. Available tools: echo, fail");
    }

    #[tokio::test]
    async fn test_tool_failure_recorded_as_text() {
        let mut agent = Agent::new(
            registry(Arc::new(AtomicUsize::new(0))),
            Scripted::boxed(vec![
                Decision::use_tool("fail", "a.pdf"),
                Decision::Finish("sorry".to_string()),
            ]),
        );

        let response = agent.run("read a.pdf").await.unwrap();
        let invocation = &response.invocations[0];
        assert_eq!(invocation.output, "Failed to read PDF: no readable text");
        assert_eq!(invocation.error, Some(ToolErrorKind::DocumentUnreadable));

        let turn = &agent.transcript().turns()[1];
        assert_eq!(turn.error, Some(ToolErrorKind::DocumentUnreadable));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut agent =
            Agent::new(registry(calls.clone()), Scripted::boxed(vec![])).with_max_iterations(3);

        let err = agent.run("loop forever").await.unwrap_err();
        assert!(matches!(err, AgentError::IterationLimitExceeded { limit: 3 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(agent.state(), AgentState::AwaitingInput);
    }

    #[tokio::test]
    async fn test_memory_carries_and_reset_clears() {
        let finish = |s: &str| Decision::Finish(s.to_string());
        let mut agent = Agent::new(
            registry(Arc::new(AtomicUsize::new(0))),
            Scripted::boxed(vec![finish("one"), finish("two")]),
        )
        .with_memory(MemoryPolicy::new(100, 10_000));

        agent.run("first").await.unwrap();
        agent.run("second").await.unwrap();
        assert_eq!(agent.transcript().len(), 4);

        agent.reset();
        assert!(agent.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_without_memory_each_request_starts_fresh() {
        let finish = |s: &str| Decision::Finish(s.to_string());
        let mut agent = Agent::new(
            registry(Arc::new(AtomicUsize::new(0))),
            Scripted::boxed(vec![finish("one"), finish("two")]),
        );

        agent.run("first").await.unwrap();
        agent.run("second").await.unwrap();
        assert_eq!(agent.transcript().len(), 2);
        assert_eq!(agent.transcript().turns()[0].content, "second");
    }

    #[tokio::test]
    async fn test_memory_window_evicts_before_request() {
        let finish = |s: &str| Decision::Finish(s.to_string());
        let mut agent = Agent::new(
            registry(Arc::new(AtomicUsize::new(0))),
            Scripted::boxed(vec![finish("a"), finish("b"), finish("c")]),
        )
        .with_memory(MemoryPolicy::new(2, 10_000));

        for request in ["r1", "r2", "r3"] {
            agent.run(request).await.unwrap();
        }
        let contents: Vec<&str> = agent
            .transcript()
            .turns()
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(contents, vec!["r2", "b", "r3", "c"]);
    }
}
