//! Decision steps: choose the next tool call or produce the final answer.

use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;

use super::memory::{Role, Transcript};
use crate::llm::{GenerationError, Generator};
use crate::tools::{
    parse_titles, split_paper_blocks, ToolErrorKind, ToolRegistry, DOCUMENT_READER, EXPLAIN_TOPIC,
    GAP_ANALYSIS, METHODOLOGY, PAPER_SEARCH, SEPARATOR, SUMMARIZE,
};

/// Outcome of one decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    UseTool { tool: String, input: String },
    Finish(String),
}

impl Decision {
    pub fn use_tool(tool: impl Into<String>, input: impl Into<String>) -> Self {
        Decision::UseTool {
            tool: tool.into(),
            input: input.into(),
        }
    }
}

/// A tool turn as seen by a decision step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation<'a> {
    pub tool: &'a str,
    pub text: &'a str,
    /// Set when `text` is an error message
    pub error: Option<ToolErrorKind>,
}

impl Observation<'_> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// What a decision step can see
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// The request being answered
    pub request: &'a str,
    /// Transcript so far, ending with the request or the latest observation
    pub transcript: &'a Transcript,
    pub tools: &'a ToolRegistry,
}

impl<'a> DecisionContext<'a> {
    /// Tool outputs recorded since the current request was made
    pub fn observations(&self) -> Vec<Observation<'a>> {
        let turns = self.transcript.turns();
        let start = turns
            .iter()
            .rposition(|t| t.role == Role::User)
            .map_or(0, |i| i + 1);
        turns[start..]
            .iter()
            .filter(|t| t.role == Role::Tool)
            .map(|t| Observation {
                tool: t.tool.as_deref().unwrap_or_default(),
                text: t.content.as_str(),
                error: t.error,
            })
            .collect()
    }
}

/// Errors from a decision step
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Pluggable policy choosing the agent's next move
#[async_trait]
pub trait DecisionStep: Send + Sync + std::fmt::Debug {
    async fn decide(&self, context: &DecisionContext<'_>) -> Result<Decision, DecisionError>;
}

// ===== Model-backed ReAct decider =====

/// Asks the generation backend for the next step in ReAct format
#[derive(Debug, Clone)]
pub struct LlmDecider {
    generator: Arc<dyn Generator>,
}

impl LlmDecider {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Render the decision prompt
    pub fn prompt(context: &DecisionContext<'_>) -> String {
        let catalogue = context
            .tools
            .all()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");
        let names = context.tools.names().join(", ");

        format!(
            "You are a research assistant that answers questions by using tools.

Available tools:
{catalogue}

To use a tool, respond with:
Thought: your reasoning
Action: the tool name, one of [{names}]
Action Input: the input for the tool

When you can answer, respond with:
Thought: your reasoning
Final Answer: the answer for the user

Conversation so far:
{transcript}

Thought:",
            transcript = context.transcript.render()
        )
    }
}

fn capture(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn strip_wrapping(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`').trim()
}

/// Parse a ReAct completion.
///
/// `Action:` with `Action Input:` selects a tool; `Final Answer:` ends the
/// request; anything else is taken as the final answer verbatim.
pub fn parse_react(completion: &str) -> Decision {
    let action = capture(r"(?m)^\s*Action\s*:\s*(.+?)\s*$", completion);
    let final_answer = capture(r"(?s)Final Answer\s*:\s*(.*)", completion);
    let action_first = match (completion.find("Action"), completion.find("Final Answer")) {
        (Some(a), Some(f)) => a < f,
        (Some(_), None) => true,
        _ => false,
    };

    if let (Some(tool), true) = (action.as_deref(), action_first) {
        let input = capture(
            r"(?s)Action Input\s*:\s*(.*?)(?:\n\s*(?:Observation|Final Answer|Thought)\s*:|$)",
            completion,
        )
        .unwrap_or_default();
        return Decision::use_tool(strip_wrapping(tool), strip_wrapping(&input));
    }

    match final_answer {
        Some(answer) if !answer.is_empty() => Decision::Finish(answer),
        _ => Decision::Finish(completion.trim().to_string()),
    }
}

#[async_trait]
impl DecisionStep for LlmDecider {
    async fn decide(&self, context: &DecisionContext<'_>) -> Result<Decision, DecisionError> {
        let completion = self.generator.generate(&Self::prompt(context)).await?;
        let decision = parse_react(&completion);
        tracing::debug!("Decided {:?}", decision);
        Ok(decision)
    }
}

// ===== Rule-based planner =====

/// Plans tool calls from request keywords without a model in the loop
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordPlanner;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Plan {
    Read(String),
    Methodology,
    Gap,
    Summarize,
    Search,
    Explain,
}

const FILLER_WORDS: &[&str] = &[
    "a", "about", "an", "analyse", "analyze", "and", "are", "explain", "find", "first", "for",
    "gap", "gaps", "give", "identify", "in", "is", "latest", "list", "me", "methodology", "of",
    "on", "one", "paper", "papers", "please", "recent", "research", "search", "show", "suggest",
    "summarise", "summarize", "summary", "the", "then", "to", "what", "with",
];

fn pdf_path(request: &str) -> Option<String> {
    request.split_whitespace().find_map(|word| {
        let word = word.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | ',' | ';' | ':' | '(' | ')'));
        let word = word
            .strip_suffix('.')
            .filter(|w| w.to_lowercase().ends_with(".pdf"))
            .unwrap_or(word);
        word.to_lowercase().ends_with(".pdf").then(|| word.to_string())
    })
}

fn plan_for(request: &str) -> Plan {
    if let Some(path) = pdf_path(request) {
        return Plan::Read(path);
    }
    let lower = request.to_lowercase();
    if lower.contains("methodolog") || lower.contains("how to address") {
        Plan::Methodology
    } else if lower.contains("gap") {
        Plan::Gap
    } else if lower.contains("summar") {
        Plan::Summarize
    } else if ["search", "find", "paper", "papers", "literature"]
        .iter()
        .any(|k| lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == *k))
    {
        Plan::Search
    } else {
        Plan::Explain
    }
}

/// The request with command words removed
fn topic_of(request: &str) -> String {
    let topic = request
        .split_whitespace()
        .filter(|word| {
            let bare = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            !FILLER_WORDS.contains(&bare.as_str())
        })
        .collect::<Vec<_>>()
        .join(" ");
    let topic = topic.trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    if topic.is_empty() {
        request.trim().to_string()
    } else {
        topic.to_string()
    }
}

impl KeywordPlanner {
    fn next(plan: &Plan, topic: &str, observations: &[Observation<'_>]) -> Decision {
        let step = observations.len();
        let last = observations
            .last()
            .map(|o| o.text.to_string())
            .unwrap_or_default();

        // A failed step ends the plan with its error text
        if observations.last().is_some_and(|o| !o.is_success()) {
            return Decision::Finish(last);
        }

        match (plan, step) {
            (Plan::Read(path), 0) => Decision::use_tool(DOCUMENT_READER, path.as_str()),
            (Plan::Explain, 0) => Decision::use_tool(EXPLAIN_TOPIC, topic),
            (Plan::Search | Plan::Summarize | Plan::Gap | Plan::Methodology, 0) => {
                Decision::use_tool(PAPER_SEARCH, topic)
            }
            (Plan::Summarize, 1) => match split_paper_blocks(&last).into_iter().next() {
                Some(block) => Decision::use_tool(SUMMARIZE, block),
                None => Decision::Finish(last),
            },
            (Plan::Summarize, 2) => {
                let title = split_paper_blocks(observations[0].text)
                    .first()
                    .and_then(|b| parse_titles(b).into_iter().next());
                match title {
                    Some(title) => Decision::Finish(format!("Summary of \"{}\":\n\n{}", title, last)),
                    None => Decision::Finish(last),
                }
            }
            (Plan::Gap | Plan::Methodology, 1) => {
                let blocks = split_paper_blocks(&last);
                if blocks.is_empty() {
                    Decision::Finish(last)
                } else {
                    Decision::use_tool(GAP_ANALYSIS, blocks.join("\n\n"))
                }
            }
            (Plan::Methodology, 2) => {
                let gap = last.replace(SEPARATOR, " ");
                Decision::use_tool(METHODOLOGY, format!("{}{}{}", topic, SEPARATOR, gap))
            }
            _ => Decision::Finish(last),
        }
    }
}

#[async_trait]
impl DecisionStep for KeywordPlanner {
    async fn decide(&self, context: &DecisionContext<'_>) -> Result<Decision, DecisionError> {
        let plan = plan_for(context.request);
        let topic = topic_of(context.request).replace(SEPARATOR, " ");
        let decision = Self::next(&plan, &topic, &context.observations());
        tracing::debug!("Planned {:?} -> {:?}", plan, decision);
        Ok(decision)
    }
}
