//! Mock generator for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{GenerationError, Generator};

/// A generator that replays scripted completions and records every prompt.
///
/// Scripted replies are consumed in order; once exhausted, the default
/// reply is returned.
#[derive(Debug, Default)]
pub struct MockGenerator {
    default_reply: String,
    script: Mutex<VecDeque<String>>,
    failure: Mutex<Option<GenerationError>>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Always reply with `text`
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            default_reply: text.into(),
            ..Self::default()
        }
    }

    /// Reply with each scripted text in turn, then with an empty string
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Fail the next call with `error`, then behave normally
    pub fn failing(error: GenerationError) -> Self {
        Self {
            failure: Mutex::new(Some(error)),
            ..Self::default()
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recent prompt
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        if let Some(error) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).take() {
            return Err(error);
        }

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        Ok(scripted.unwrap_or_else(|| self.default_reply.clone()))
    }
}
