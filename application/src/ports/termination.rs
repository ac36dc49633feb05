//! Termination condition port
//!
//! Checked by the coordinator after every dispatched turn, on the messages
//! that turn appended. Independent of the progress ledger's own completion
//! judgment.

use taskforce_domain::{Message, MessageKind};

pub trait TerminationCondition: Send + Sync {
    /// Returns the reason to stop, if the condition fired.
    fn check(&self, messages: &[Message]) -> Option<String>;

    /// Clear any state kept between runs.
    fn reset(&self) {}
}

/// Fires when an agent reply mentions a fixed phrase.
pub struct TextMentionTermination {
    text: String,
}

impl TextMentionTermination {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for TextMentionTermination {
    fn default() -> Self {
        Self::new("TERMINATE")
    }
}

impl TerminationCondition for TextMentionTermination {
    fn check(&self, messages: &[Message]) -> Option<String> {
        if self.text.is_empty() {
            return None;
        }
        messages
            .iter()
            .filter(|m| m.kind == MessageKind::AgentReply)
            .find(|m| m.content.contains(&self.text))
            .map(|m| format!("'{}' mentioned by {}", self.text, m.sender))
    }
}

/// Never fires.
pub struct NoTermination;

impl TerminationCondition for NoTermination {
    fn check(&self, _messages: &[Message]) -> Option<String> {
        None
    }
}
