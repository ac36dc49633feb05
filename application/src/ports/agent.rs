//! Agent port
//!
//! Every roster member, whatever its variant, is dispatched through the same
//! [`Agent`] trait: it receives a read-only snapshot of the conversation and
//! one instruction, and produces exactly one reply or one failure.

use async_trait::async_trait;
use std::time::Duration;
use taskforce_domain::{AgentDescriptor, FaultClass, Message};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A successful agent turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub content: String,
    /// Exit code of executed code, for agents that run code
    pub exit_code: Option<i32>,
}

impl AgentReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            exit_code: None,
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }
}

/// A failed agent turn
///
/// Failures are recorded on the conversation and never abort the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentTurnError {
    /// The agent failed on its own (model error, spawn failure, ...)
    #[error("{0}")]
    Fault(String),

    /// The constraint harness raised a scheduled fault
    #[error("injected {class} fault on attempt {attempt}: {message}")]
    Injected {
        class: FaultClass,
        attempt: u32,
        message: String,
    },

    #[error("turn timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AgentTurnError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentTurnError::Cancelled)
    }

    pub fn is_injected(&self) -> bool {
        matches!(self, AgentTurnError::Injected { .. })
    }
}

/// A roster member the coordinator can dispatch
#[async_trait]
pub trait Agent: Send + Sync {
    /// Immutable identity (name, kind, capabilities, description)
    fn descriptor(&self) -> &AgentDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Capability description shown to the coordinator
    fn describe(&self) -> String {
        self.descriptor().description.clone()
    }

    /// Handle exactly one turn.
    ///
    /// `history` is the conversation up to and including the instruction
    /// message addressed to this agent.
    async fn handle_turn(
        &self,
        history: &[Message],
        instruction: &str,
        cancellation: &CancellationToken,
    ) -> Result<AgentReply, AgentTurnError>;
}
