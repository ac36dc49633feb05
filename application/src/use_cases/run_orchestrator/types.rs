//! Type definitions for the coordinator use case.

use serde::Serialize;
use taskforce_domain::{
    AgentKind, ConstraintError, Diagnostic, ExecutionRecord, Message, ProgressLedger, RunStatus,
    StopReason, TaskLedger,
};
use thiserror::Error;

/// Fatal configuration problems.
///
/// Raised before the offending dispatch happens; the only errors a run
/// returns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Task cannot be empty")]
    EmptyTask,

    #[error("unknown agent '{name}' nominated as next speaker (roster: {available})")]
    UnknownAgent { name: String, available: String },

    #[error("duplicate agent name '{0}' in roster")]
    DuplicateAgent(String),

    #[error("roster is missing a required {0} agent")]
    MissingRequiredAgent(AgentKind),

    #[error("hil_mode is enabled but the roster has no human proxy")]
    MissingHumanProxy,

    #[error("roster has a human proxy but hil_mode is disabled")]
    UnexpectedHumanProxy,

    #[error("hil_mode requires a human input port")]
    MissingHumanInput,

    #[error("{0} must be at least 1")]
    ZeroBudget(&'static str),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}

/// Errors a run can return
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub status: RunStatus,
    pub stop_reason: StopReason,
    /// Final answer; the last agent reply for incomplete runs
    pub answer: Option<String>,
    /// Latest task ledger
    pub task_ledger: Option<TaskLedger>,
    pub progress_ledgers: Vec<ProgressLedger>,
    pub history: Vec<Message>,
    pub diagnostics: Vec<Diagnostic>,
    pub execution_records: Vec<ExecutionRecord>,
    /// Number of agent dispatches
    pub turns: u32,
    pub replans: u32,
}

impl RunOutput {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    /// Plan version of the latest task ledger (0 when planning failed)
    pub fn plan_version(&self) -> u32 {
        self.task_ledger.as_ref().map(TaskLedger::version).unwrap_or(0)
    }
}
