//! Conversation transcript and its sliding-window memory policy.

use serde::Serialize;

use crate::config::AgentConfig;
use crate::tools::ToolErrorKind;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    Tool,
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Tool that produced the content, for tool turns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Set when the tool content is an error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolErrorKind>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool: None,
            error: None,
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
            tool: None,
            error: None,
        }
    }

    pub fn tool(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool: Some(name.into()),
            error: None,
        }
    }

    /// Mark a tool turn as carrying an error of `kind`
    pub fn with_error(mut self, kind: Option<ToolErrorKind>) -> Self {
        self.error = kind;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Ordered turns of a conversation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Total characters of turn content
    pub fn char_count(&self) -> usize {
        self.turns.iter().map(Turn::char_count).sum()
    }

    /// Plain-text rendering used in decision prompts
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|turn| match (&turn.role, &turn.tool, turn.is_error()) {
                (Role::User, _, _) => format!("User: {}", turn.content),
                (Role::Agent, _, _) => format!("Assistant: {}", turn.content),
                (Role::Tool, Some(name), false) => {
                    format!("Observation ({}): {}", name, turn.content)
                }
                (Role::Tool, Some(name), true) => {
                    format!("Observation ({}, failed): {}", name, turn.content)
                }
                (Role::Tool, None, _) => format!("Observation: {}", turn.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn evict_front(&mut self, count: usize) {
        self.turns.drain(..count.min(self.turns.len()));
    }
}

/// Sliding window bounding the carried-over transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryPolicy {
    pub max_turns: usize,
    pub max_chars: usize,
}

impl MemoryPolicy {
    pub fn new(max_turns: usize, max_chars: usize) -> Self {
        Self {
            max_turns,
            max_chars,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.memory_max_turns, config.memory_max_chars)
    }

    /// Evict oldest turns until both limits hold. Returns the number evicted.
    pub fn enforce(&self, transcript: &mut Transcript) -> usize {
        let mut evict = transcript.len().saturating_sub(self.max_turns);
        let mut chars: usize = transcript.turns[evict..]
            .iter()
            .map(Turn::char_count)
            .sum();

        while chars > self.max_chars && evict < transcript.len() {
            chars -= transcript.turns[evict].char_count();
            evict += 1;
        }

        if evict > 0 {
            tracing::debug!("Evicting {} turns from memory", evict);
            transcript.evict_front(evict);
        }
        evict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(contents: &[&str]) -> Transcript {
        let mut t = Transcript::new();
        for c in contents {
            t.push(Turn::user(*c));
        }
        t
    }

    #[test]
    fn test_turn_limit_evicts_oldest() {
        let mut t = transcript(&["a", "b", "c", "d"]);
        let evicted = MemoryPolicy::new(2, 1000).enforce(&mut t);
        assert_eq!(evicted, 2);
        let remaining: Vec<_> = t.turns().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(remaining, vec!["c", "d"]);
    }

    #[test]
    fn test_char_limit_evicts_oldest() {
        let mut t = transcript(&["aaaa", "bbbb", "cc"]);
        MemoryPolicy::new(10, 6).enforce(&mut t);
        assert_eq!(t.len(), 2);
        assert_eq!(t.char_count(), 6);
    }

    #[test]
    fn test_within_limits_untouched() {
        let mut t = transcript(&["a", "b"]);
        assert_eq!(MemoryPolicy::new(2, 2).enforce(&mut t), 0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_render_labels_roles() {
        let mut t = Transcript::new();
        t.push(Turn::user("find papers"));
        t.push(Turn::tool("paper_search", "Title: X"));
        t.push(Turn::agent("done"));
        assert_eq!(
            t.render(),
            "User: find papers\nObservation (paper_search): Title: X\nAssistant: done"
        );
    }

    #[test]
    fn test_render_marks_failed_observations() {
        let mut t = Transcript::new();
        t.push(
            Turn::tool("gap_analysis", "Gemini API failed (500)")
                .with_error(Some(ToolErrorKind::UpstreamUnavailable)),
        );
        assert!(t.turns()[0].is_error());
        assert_eq!(
            t.render(),
            "Observation (gap_analysis, failed): Gemini API failed (500)"
        );
    }
}
