//! Ledger components of the coordinator.
//!
//! The coordinator is composed from three injected collaborators:
//!
//! - [`TaskLedgerBuilder`]: facts, guesses and plan (initial and replanned)
//! - [`ProgressLedgerEvaluator`]: the per-cycle five-question assessment
//! - [`AnswerSynthesizer`]: the final answer once the request is satisfied
//!
//! The `Llm*` implementations open a fresh session per call, so each call is
//! a pure function of its inputs apart from the model call itself.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use taskforce_domain::{
    AgentDescriptor, LedgerParseError, Message, OrchestratorPromptTemplate, ProgressLedger,
    TaskLedger, TaskLedgerDraft, parse_progress_ledger, parse_task_ledger,
};
use thiserror::Error;
use tracing::debug;

/// Why a ledger call produced nothing usable
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("unparseable ledger: {0}")]
    Parse(#[from] LedgerParseError),
}

/// Render the team as `Name: description` lines.
pub fn team_text(team: &[AgentDescriptor]) -> String {
    team.iter()
        .map(AgentDescriptor::team_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
pub trait TaskLedgerBuilder: Send + Sync {
    /// Build ledger content. With `prior`, keep its facts as a basis and
    /// update them from `history` before planning anew.
    async fn build(
        &self,
        task: &str,
        team: &[AgentDescriptor],
        prior: Option<&TaskLedger>,
        history: &[Message],
    ) -> Result<TaskLedgerDraft, LedgerError>;
}

#[async_trait]
pub trait ProgressLedgerEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        task: &str,
        ledger: &TaskLedger,
        history: &[Message],
        team: &[AgentDescriptor],
    ) -> Result<ProgressLedger, LedgerError>;
}

#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    async fn synthesize(&self, task: &str, history: &[Message]) -> Result<String, LedgerError>;
}

fn task_ledger_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "facts": {"type": "array", "items": {"type": "string"}},
            "guesses": {"type": "array", "items": {"type": "string"}},
            "plan": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["facts", "guesses", "plan"]
    })
}

fn progress_ledger_schema() -> serde_json::Value {
    let bool_answer = json!({
        "type": "object",
        "properties": {"reason": {"type": "string"}, "answer": {"type": "boolean"}},
        "required": ["reason", "answer"]
    });
    let string_answer = json!({
        "type": "object",
        "properties": {"reason": {"type": "string"}, "answer": {"type": "string"}},
        "required": ["reason", "answer"]
    });
    json!({
        "type": "object",
        "properties": {
            "is_request_satisfied": bool_answer,
            "is_progress_being_made": bool_answer,
            "is_in_loop": bool_answer,
            "next_speaker": string_answer,
            "instruction_or_question": string_answer
        },
        "required": taskforce_domain::ledger::parsing::PROGRESS_FIELDS
    })
}

/// LLM-backed task ledger builder
pub struct LlmTaskLedgerBuilder {
    gateway: Arc<dyn LlmGateway>,
}

impl LlmTaskLedgerBuilder {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl TaskLedgerBuilder for LlmTaskLedgerBuilder {
    async fn build(
        &self,
        task: &str,
        team: &[AgentDescriptor],
        prior: Option<&TaskLedger>,
        history: &[Message],
    ) -> Result<TaskLedgerDraft, LedgerError> {
        let team = team_text(team);
        let prompt = match prior {
            None => OrchestratorPromptTemplate::task_ledger(task, &team),
            Some(prior) => OrchestratorPromptTemplate::replan(task, &team, prior, history),
        };
        let session = self
            .gateway
            .create_session_with_system_prompt(OrchestratorPromptTemplate::system())
            .await?;
        let response = session
            .send_structured(&prompt, &task_ledger_schema())
            .await?;
        debug!("Task ledger response: {}", response);
        Ok(parse_task_ledger(&response)?)
    }
}

/// LLM-backed progress ledger evaluator
pub struct LlmProgressLedgerEvaluator {
    gateway: Arc<dyn LlmGateway>,
}

impl LlmProgressLedgerEvaluator {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ProgressLedgerEvaluator for LlmProgressLedgerEvaluator {
    async fn evaluate(
        &self,
        task: &str,
        ledger: &TaskLedger,
        history: &[Message],
        team: &[AgentDescriptor],
    ) -> Result<ProgressLedger, LedgerError> {
        let names: Vec<&str> = team.iter().map(|d| d.name.as_str()).collect();
        let prompt = OrchestratorPromptTemplate::progress_ledger(
            task,
            &team_text(team),
            &names,
            ledger,
            history,
        );
        let session = self
            .gateway
            .create_session_with_system_prompt(OrchestratorPromptTemplate::system())
            .await?;
        let response = session
            .send_structured(&prompt, &progress_ledger_schema())
            .await?;
        debug!("Progress ledger response: {}", response);
        Ok(parse_progress_ledger(&response, ledger.version())?)
    }
}

/// LLM-backed final answer synthesizer
pub struct LlmAnswerSynthesizer {
    gateway: Arc<dyn LlmGateway>,
}

impl LlmAnswerSynthesizer {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AnswerSynthesizer for LlmAnswerSynthesizer {
    async fn synthesize(&self, task: &str, history: &[Message]) -> Result<String, LedgerError> {
        let session = self
            .gateway
            .create_session_with_system_prompt(OrchestratorPromptTemplate::system())
            .await?;
        let answer = session
            .send(&OrchestratorPromptTemplate::final_answer(task, history))
            .await?;
        Ok(answer.trim().to_string())
    }
}
