//! Code runner port
//!
//! Defines how the code executor agent runs fenced code blocks. Isolation is
//! the adapter's concern.

use async_trait::async_trait;
use std::time::Duration;
use taskforce_domain::CodeBlock;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Combined result of running one or more code blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExecutionOutput {
    /// Exit code of the last block that ran
    pub exit_code: i32,
    /// Interleaved stdout/stderr of every block that ran
    pub output: String,
}

impl CodeExecutionOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeRunnerError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("failed to start process: {0}")]
    SpawnFailed(String),

    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Port for running code blocks
#[async_trait]
pub trait CodeRunnerPort: Send + Sync {
    /// Run blocks in order, stopping at the first non-zero exit code.
    async fn run(
        &self,
        blocks: &[CodeBlock],
        cancellation: &CancellationToken,
    ) -> Result<CodeExecutionOutput, CodeRunnerError>;
}
