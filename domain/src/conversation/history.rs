//! Append-only conversation history.

use super::message::{Message, MessageKind};
use chrono::Utc;

/// Ordered log of every message in a run.
///
/// Only the coordinator appends; agents receive `&[Message]` snapshots.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a copy of it with its assigned sequence.
    pub fn append(
        &mut self,
        sender: impl Into<String>,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> Message {
        let message = Message {
            sequence: self.next_sequence(),
            sender: sender.into(),
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        };
        self.messages.push(message.clone());
        message
    }

    fn next_sequence(&self) -> u64 {
        self.messages.last().map(|m| m.sequence + 1).unwrap_or(1)
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages appended after the first `from` entries.
    pub fn since(&self, from: usize) -> &[Message] {
        &self.messages[from.min(self.messages.len())..]
    }

    /// Messages appended after the most recent message of `kind`.
    pub fn since_last(&self, kind: MessageKind) -> &[Message] {
        super::message::since_last(&self.messages, kind)
    }

    /// Most recent reply (not failure) from a roster agent.
    pub fn last_agent_reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::AgentReply)
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
