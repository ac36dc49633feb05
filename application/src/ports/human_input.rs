//! Human input port for the human proxy agent.
//!
//! # Architecture
//!
//! Following the Ports and Adapters pattern:
//! - **Port**: [`HumanInputPort`] - defined here in application layer
//! - **Adapter**: `StdinHumanInput` - implemented in presentation layer
//!
//! # Built-in Implementations
//!
//! - [`AutoReplyInput`] - Always answers with a fixed reply (non-interactive runs and tests)

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Error type for human input operations.
///
/// These represent failures while collecting input, not answers the user gave.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HumanInputError {
    /// User cancelled the operation (e.g., via Ctrl+C).
    #[error("Operation cancelled")]
    Cancelled,
    /// Input/output error (e.g., terminal read failure).
    #[error("I/O error: {0}")]
    IoError(String),
    /// Input stream closed before an answer was given.
    #[error("input closed")]
    Closed,
}

/// Port for asking the human user a question.
#[async_trait]
pub trait HumanInputPort: Send + Sync {
    /// Show `prompt` to the user and wait for one answer.
    async fn request_input(
        &self,
        prompt: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, HumanInputError>;
}

/// Non-interactive implementation that always returns the same reply.
pub struct AutoReplyInput {
    reply: String,
}

impl AutoReplyInput {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for AutoReplyInput {
    fn default() -> Self {
        Self::new("No human is available. Continue with your best judgment.")
    }
}

#[async_trait]
impl HumanInputPort for AutoReplyInput {
    async fn request_input(
        &self,
        _prompt: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, HumanInputError> {
        if cancellation.is_cancelled() {
            return Err(HumanInputError::Cancelled);
        }
        Ok(self.reply.clone())
    }
}
