//! Orchestrator parameters: control-loop budgets.
//!
//! [`OrchestratorParams`] groups the static parameters that control the
//! coordinator loop in [`Coordinator`](crate::use_cases::run_orchestrator::Coordinator).
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coordinator loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorParams {
    /// Maximum number of agent dispatches per run.
    pub max_turns: u32,
    /// Consecutive stalled cycles that trigger a replan.
    pub max_stalls: u32,
    /// Phrase in an agent reply that stops the run.
    pub termination_phrase: String,
    /// Timeout for a single agent turn.
    pub turn_timeout: Option<Duration>,
    /// Retries for a failing ledger call before giving up.
    pub max_ledger_retries: u32,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            max_turns: 20,
            max_stalls: 3,
            termination_phrase: "TERMINATE".to_string(),
            turn_timeout: None,
            max_ledger_retries: 3,
        }
    }
}

impl OrchestratorParams {
    // ==================== Builder Methods ====================

    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max;
        self
    }

    pub fn with_max_stalls(mut self, max: u32) -> Self {
        self.max_stalls = max;
        self
    }

    pub fn with_termination_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.termination_phrase = phrase.into();
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn with_max_ledger_retries(mut self, retries: u32) -> Self {
        self.max_ledger_retries = retries;
        self
    }

    /// Total attempts per ledger call (first try plus retries).
    pub fn ledger_attempts(&self) -> u32 {
        self.max_ledger_retries.saturating_add(1)
    }
}
