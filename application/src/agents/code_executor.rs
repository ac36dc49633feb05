//! Code executor agent: runs code blocks found in the conversation.

use crate::ports::agent::{Agent, AgentReply, AgentTurnError};
use crate::ports::code_runner::{CodeRunnerError, CodeRunnerPort};
use async_trait::async_trait;
use std::sync::Arc;
use taskforce_domain::{AgentDescriptor, AgentKind, CodeBlock, Message, extract_code_blocks};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const NO_CODE_REPLY: &str = "No code blocks found in the thread. Please provide at least one \
markdown-encoded code block to execute (i.e., quoting code in ```python or ```sh code blocks).";

pub struct CodeExecutorAgent {
    descriptor: AgentDescriptor,
    runner: Arc<dyn CodeRunnerPort>,
}

impl CodeExecutorAgent {
    pub fn new(runner: Arc<dyn CodeRunnerPort>) -> Self {
        Self {
            descriptor: AgentDescriptor::for_kind(AgentKind::CodeExecutor),
            runner,
        }
    }

    pub fn with_descriptor(mut self, descriptor: AgentDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }
}

/// Code blocks of the most recent message that has any.
fn latest_code_blocks(history: &[Message]) -> Vec<CodeBlock> {
    history
        .iter()
        .rev()
        .map(|m| extract_code_blocks(&m.content))
        .find(|blocks| !blocks.is_empty())
        .unwrap_or_default()
}

#[async_trait]
impl Agent for CodeExecutorAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn handle_turn(
        &self,
        history: &[Message],
        _instruction: &str,
        cancellation: &CancellationToken,
    ) -> Result<AgentReply, AgentTurnError> {
        let blocks = latest_code_blocks(history);
        if blocks.is_empty() {
            return Ok(AgentReply::text(NO_CODE_REPLY));
        }

        info!(agent = %self.descriptor.name, blocks = blocks.len(), "Executing code blocks");
        match self.runner.run(&blocks, cancellation).await {
            Ok(output) => {
                let content = format!(
                    "exit code: {}\noutput:\n{}",
                    output.exit_code,
                    output.output.trim_end()
                );
                Ok(AgentReply::text(content).with_exit_code(output.exit_code))
            }
            Err(CodeRunnerError::Cancelled) => Err(AgentTurnError::Cancelled),
            Err(CodeRunnerError::Timeout(d)) => Err(AgentTurnError::Timeout(d)),
            Err(e) => Err(AgentTurnError::Fault(e.to_string())),
        }
    }
}
