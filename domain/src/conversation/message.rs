//! Conversation messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a message on the conversation represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The task that opens the run
    Task,
    /// A task ledger posted by the coordinator
    Ledger,
    /// The coordinator's instruction to the next speaker
    Instruction,
    /// An agent's reply to an instruction
    AgentReply,
    /// An agent turn that failed organically
    AgentFailure,
    /// A fault raised on purpose by the constraint harness
    InjectedFault,
    /// The synthesized (or fallback) final answer
    FinalAnswer,
}

impl MessageKind {
    /// Messages produced by roster agents rather than the coordinator.
    pub fn is_agent_output(&self) -> bool {
        matches!(
            self,
            MessageKind::AgentReply | MessageKind::AgentFailure | MessageKind::InjectedFault
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Task => "task",
            MessageKind::Ledger => "ledger",
            MessageKind::Instruction => "instruction",
            MessageKind::AgentReply => "agent_reply",
            MessageKind::AgentFailure => "agent_failure",
            MessageKind::InjectedFault => "injected_fault",
            MessageKind::FinalAnswer => "final_answer",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Strictly increasing from 1 within a run
    pub sequence: u64,
    pub sender: String,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Transcript line: `sender: content`
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.sender, self.content)
    }
}

/// Messages after the most recent one of `kind`; all of them if none matches.
pub fn since_last(messages: &[Message], kind: MessageKind) -> &[Message] {
    match messages.iter().rposition(|m| m.kind == kind) {
        Some(index) => &messages[index + 1..],
        None => messages,
    }
}

/// Render messages as a plain transcript, one block per message.
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(Message::transcript_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}
