//! Terminal input for the human proxy agent.
//!
//! ```text
//! ───────────────────────────────────────────────
//!   The team asks for your input
//! ───────────────────────────────────────────────
//! Confirm that ./build may be deleted.
//!
//! you>
//! ```

use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use taskforce_application::ports::human_input::{HumanInputError, HumanInputPort};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// Reads one line from stdin per request. Prompts go to stderr.
pub struct StdinHumanInput;

impl StdinHumanInput {
    pub fn new() -> Self {
        Self
    }

    fn display_prompt(&self, prompt: &str) -> Result<(), HumanInputError> {
        let rule = "─".repeat(47);
        let mut err = std::io::stderr();
        let shown = writeln!(err)
            .and_then(|_| writeln!(err, "{}", rule.yellow()))
            .and_then(|_| writeln!(err, "{}", "  The team asks for your input".yellow().bold()))
            .and_then(|_| writeln!(err, "{}", rule.yellow()))
            .and_then(|_| writeln!(err, "{}", prompt))
            .and_then(|_| writeln!(err))
            .and_then(|_| write!(err, "{} ", "you>".magenta().bold()))
            .and_then(|_| err.flush());
        shown.map_err(|e| HumanInputError::IoError(format!("Failed to write prompt: {}", e)))
    }
}

impl Default for StdinHumanInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HumanInputPort for StdinHumanInput {
    async fn request_input(
        &self,
        prompt: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, HumanInputError> {
        self.display_prompt(prompt)?;

        let mut reader = BufReader::new(tokio::io::stdin());
        let mut line = String::new();
        let read = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(HumanInputError::Cancelled),
            read = reader.read_line(&mut line) => read,
        };

        match read {
            Ok(0) => Err(HumanInputError::Closed),
            Ok(_) => Ok(line.trim().to_string()),
            Err(e) => Err(HumanInputError::IoError(format!("Failed to read input: {}", e))),
        }
    }
}
