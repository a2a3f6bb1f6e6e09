//! Rolling conversation memory.
//!
//! Recent turns are kept verbatim; once they exceed the token budget the
//! oldest ones are folded into a running summary by the chat model.

use super::model::{ChatMessage, ChatModel};
use crate::config::Prompts;
use crate::error::{AssistantError, Result};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// One question and its answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    fn tokens(&self) -> usize {
        estimate_tokens(&self.question) + estimate_tokens(&self.answer)
    }

    fn as_lines(&self) -> String {
        format!("Human: {}\nAI: {}", self.question, self.answer)
    }
}

/// Approximate token count: four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Summary-plus-buffer conversation memory.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    summary: Option<String>,
    buffer: VecDeque<Turn>,
    max_tokens: usize,
}

impl ConversationMemory {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            summary: None,
            buffer: VecDeque::new(),
            max_tokens,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.buffer.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.buffer.is_empty()
    }

    fn buffered_tokens(&self) -> usize {
        self.buffer.iter().map(Turn::tokens).sum()
    }

    /// The summary, if any, as a system message, then the buffered turns.
    pub fn history_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.buffer.len() * 2 + 1);
        if let Some(summary) = &self.summary {
            messages.push(ChatMessage::System(format!(
                "Summary of the conversation so far:\n{}",
                summary
            )));
        }
        for turn in &self.buffer {
            messages.push(ChatMessage::User(turn.question.clone()));
            messages.push(ChatMessage::assistant(turn.answer.clone()));
        }
        messages
    }

    /// Record a finished turn, summarising the oldest turns when over budget.
    ///
    /// The newest turn always stays verbatim. When summarisation fails the
    /// turn is still recorded and nothing is folded.
    pub async fn record(
        &mut self,
        question: &str,
        answer: &str,
        model: &dyn ChatModel,
        prompts: &Prompts,
    ) -> Result<()> {
        self.buffer.push_back(Turn {
            question: question.to_string(),
            answer: answer.to_string(),
        });

        let mut excess = self.buffered_tokens().saturating_sub(self.max_tokens);
        let mut fold = 0;
        while excess > 0 && fold + 1 < self.buffer.len() {
            excess = excess.saturating_sub(self.buffer[fold].tokens());
            fold += 1;
        }
        if fold == 0 {
            return Ok(());
        }

        let new_lines = self
            .buffer
            .iter()
            .take(fold)
            .map(Turn::as_lines)
            .collect::<Vec<_>>()
            .join("\n");

        let mut vars = HashMap::new();
        vars.insert("summary".to_string(), self.summary.clone().unwrap_or_default());
        vars.insert("new_lines".to_string(), new_lines);
        let prompt = prompts.render_with_custom(&prompts.memory.summarize, &vars);

        let reply = model.complete(&[ChatMessage::User(prompt)], &[]).await?;
        let summary = reply
            .content
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AssistantError::Agent("Empty conversation summary".to_string()))?;

        self.buffer.drain(..fold);
        self.summary = Some(summary);
        debug!("Folded {} turns into the conversation summary", fold);
        Ok(())
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.summary = None;
        self.buffer.clear();
    }
}
