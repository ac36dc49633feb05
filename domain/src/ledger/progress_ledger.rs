//! Progress ledger: the coordinator's per-cycle self-assessment.

use serde::{Deserialize, Serialize};

/// One ledger judgment together with the reason given for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAnswer<T> {
    pub answer: T,
    #[serde(default)]
    pub reason: String,
}

impl<T> LedgerAnswer<T> {
    pub fn new(answer: T, reason: impl Into<String>) -> Self {
        Self {
            answer,
            reason: reason.into(),
        }
    }
}

/// Recomputed every cycle; stamped with the plan version it was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressLedger {
    pub is_request_satisfied: LedgerAnswer<bool>,
    pub is_progress_being_made: LedgerAnswer<bool>,
    pub is_in_loop: LedgerAnswer<bool>,
    pub next_speaker: LedgerAnswer<String>,
    pub instruction_or_question: LedgerAnswer<String>,
    pub plan_version: u32,
}

impl ProgressLedger {
    pub fn is_complete(&self) -> bool {
        self.is_request_satisfied.answer
    }

    pub fn is_making_progress(&self) -> bool {
        self.is_progress_being_made.answer
    }

    pub fn is_looping(&self) -> bool {
        self.is_in_loop.answer
    }

    pub fn next_speaker(&self) -> &str {
        self.next_speaker.answer.trim()
    }

    pub fn instruction(&self) -> &str {
        &self.instruction_or_question.answer
    }

    /// Whether this assessment alone counts as a stall.
    pub fn signals_stall(&self) -> bool {
        !self.is_making_progress() || self.is_looping()
    }

    /// Re-stamp with a different plan version
    pub fn stamped(mut self, plan_version: u32) -> Self {
        self.plan_version = plan_version;
        self
    }
}
