//! LLM-backed agent (file inspector, web navigator, video inspector, code author).
//!
//! The session is created lazily on the first turn with the role's system
//! prompt. A per-agent cursor into the conversation makes each turn forward
//! only messages the agent has not seen yet, plus the instruction.

use crate::ports::agent::{Agent, AgentReply, AgentTurnError};
use crate::ports::llm_gateway::{LlmGateway, LlmSession};
use crate::use_cases::shared::race_cancellation;
use async_trait::async_trait;
use std::sync::Arc;
use taskforce_domain::core::string::preview;
use taskforce_domain::{AgentDescriptor, AgentKind, AgentPromptTemplate, Message, MessageKind};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct SessionState {
    session: Option<Box<dyn LlmSession>>,
    /// Number of history messages already forwarded
    cursor: usize,
}

pub struct LlmAgent {
    descriptor: AgentDescriptor,
    gateway: Arc<dyn LlmGateway>,
    state: Mutex<SessionState>,
}

impl LlmAgent {
    pub fn new(descriptor: AgentDescriptor, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            descriptor,
            gateway,
            state: Mutex::new(SessionState {
                session: None,
                cursor: 0,
            }),
        }
    }

    pub fn for_kind(kind: AgentKind, gateway: Arc<dyn LlmGateway>) -> Self {
        Self::new(AgentDescriptor::for_kind(kind), gateway)
    }

    /// Messages after the cursor, without the agent's own replies and the
    /// trailing instruction (which is sent separately).
    fn unseen<'a>(&self, history: &'a [Message], cursor: usize) -> Vec<&'a Message> {
        let mut window = &history[cursor.min(history.len())..];
        if let Some((last, rest)) = window.split_last()
            && last.kind == MessageKind::Instruction
        {
            window = rest;
        }
        window
            .iter()
            .filter(|m| m.sender != self.descriptor.name)
            .collect()
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn handle_turn(
        &self,
        history: &[Message],
        instruction: &str,
        cancellation: &CancellationToken,
    ) -> Result<AgentReply, AgentTurnError> {
        let mut state = self.state.lock().await;

        if state.session.is_none() {
            let system_prompt = AgentPromptTemplate::system(self.descriptor.kind);
            let session = race_cancellation(
                cancellation,
                self.gateway.create_session_with_system_prompt(&system_prompt),
            )
            .await
            .ok_or(AgentTurnError::Cancelled)?
            .map_err(|e| AgentTurnError::Fault(e.to_string()))?;
            state.session = Some(session);
        }

        let unseen: Vec<Message> = self
            .unseen(history, state.cursor)
            .into_iter()
            .cloned()
            .collect();
        let prompt = AgentPromptTemplate::turn(&unseen, instruction);
        state.cursor = history.len();

        let Some(session) = state.session.as_ref() else {
            return Err(AgentTurnError::Fault("session unavailable".to_string()));
        };
        debug!(
            agent = %self.descriptor.name,
            unseen = unseen.len(),
            "Sending turn: {}",
            preview(instruction, 80)
        );

        let text = race_cancellation(cancellation, session.send(&prompt))
            .await
            .ok_or(AgentTurnError::Cancelled)?
            .map_err(|e| AgentTurnError::Fault(e.to_string()))?;

        Ok(AgentReply::text(text))
    }
}
