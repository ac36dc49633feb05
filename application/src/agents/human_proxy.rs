//! Human proxy agent: relays instructions to a human.

use crate::ports::agent::{Agent, AgentReply, AgentTurnError};
use crate::ports::human_input::{HumanInputError, HumanInputPort};
use async_trait::async_trait;
use std::sync::Arc;
use taskforce_domain::{AgentDescriptor, AgentKind, Message};
use tokio_util::sync::CancellationToken;

pub struct HumanProxyAgent {
    descriptor: AgentDescriptor,
    input: Arc<dyn HumanInputPort>,
}

impl HumanProxyAgent {
    pub fn new(input: Arc<dyn HumanInputPort>) -> Self {
        Self {
            descriptor: AgentDescriptor::for_kind(AgentKind::HumanProxy),
            input,
        }
    }
}

#[async_trait]
impl Agent for HumanProxyAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn handle_turn(
        &self,
        _history: &[Message],
        instruction: &str,
        cancellation: &CancellationToken,
    ) -> Result<AgentReply, AgentTurnError> {
        match self.input.request_input(instruction, cancellation).await {
            Ok(answer) => Ok(AgentReply::text(answer)),
            Err(HumanInputError::Cancelled) => Err(AgentTurnError::Cancelled),
            Err(e) => Err(AgentTurnError::Fault(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::human_input::AutoReplyInput;

    #[tokio::test]
    async fn test_forwards_instruction_to_human() {
        let agent = HumanProxyAgent::new(Arc::new(AutoReplyInput::new("use /var/tmp instead")));
        let reply = agent
            .handle_turn(&[], "Which directory?", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.content, "use /var/tmp instead");
        assert_eq!(agent.name(), "User");
    }

    #[tokio::test]
    async fn test_cancelled_input_cancels_turn() {
        let agent = HumanProxyAgent::new(Arc::new(AutoReplyInput::default()));
        let token = CancellationToken::new();
        token.cancel();
        let result = agent.handle_turn(&[], "?", &token).await;
        assert_eq!(result, Err(AgentTurnError::Cancelled));
    }
}
