//! Coordinator states and run outcomes.

use serde::{Deserialize, Serialize};

/// Control-loop state of the coordinator.
///
/// ```text
/// Planning → Evaluating ⇄ Dispatching
///               ↓    ↑
///          Replanning
///               ↓
///          Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    Planning,
    Evaluating,
    Dispatching,
    Replanning,
    Terminated,
}

impl CoordinatorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorState::Planning => "planning",
            CoordinatorState::Evaluating => "evaluating",
            CoordinatorState::Dispatching => "dispatching",
            CoordinatorState::Replanning => "replanning",
            CoordinatorState::Terminated => "terminated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CoordinatorState::Terminated)
    }
}

impl std::fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    Incomplete,
    Cancelled,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Complete => write!(f, "complete"),
            RunStatus::Incomplete => write!(f, "incomplete"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Why the run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum StopReason {
    /// The progress ledger judged the request satisfied
    RequestSatisfied,
    /// The external termination condition fired
    TerminationCondition(String),
    /// The dispatch budget was exhausted
    MaxTurnsReached,
    /// Progress evaluation or replanning kept failing
    LedgerUnavailable,
    /// The initial task ledger could not be built
    PlanningFailed,
    Cancelled,
}

impl StopReason {
    pub fn status(&self) -> RunStatus {
        match self {
            StopReason::RequestSatisfied | StopReason::TerminationCondition(_) => {
                RunStatus::Complete
            }
            StopReason::MaxTurnsReached
            | StopReason::LedgerUnavailable
            | StopReason::PlanningFailed => RunStatus::Incomplete,
            StopReason::Cancelled => RunStatus::Cancelled,
        }
    }

    /// Whether the coordinator synthesizes a final answer for this reason.
    pub fn synthesizes_answer(&self) -> bool {
        self.status() == RunStatus::Complete
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::RequestSatisfied => write!(f, "request satisfied"),
            StopReason::TerminationCondition(why) => write!(f, "termination condition: {}", why),
            StopReason::MaxTurnsReached => write!(f, "max turns reached"),
            StopReason::LedgerUnavailable => write!(f, "progress ledger unavailable"),
            StopReason::PlanningFailed => write!(f, "planning failed"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}
