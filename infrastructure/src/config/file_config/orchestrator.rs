//! Coordinator loop configuration from TOML (`[orchestrator]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskforce_application::OrchestratorParams;

/// Raw orchestrator configuration from TOML
///
/// # Example
///
/// ```toml
/// [orchestrator]
/// max_turns = 20
/// max_stalls = 3
/// termination_phrase = "TERMINATE"
/// turn_timeout_seconds = 300
/// max_ledger_retries = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    pub max_turns: u32,
    pub max_stalls: u32,
    pub termination_phrase: String,
    /// Bound on a single agent turn; unbounded when absent
    pub turn_timeout_seconds: Option<u64>,
    pub max_ledger_retries: u32,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        let params = OrchestratorParams::default();
        Self {
            max_turns: params.max_turns,
            max_stalls: params.max_stalls,
            termination_phrase: params.termination_phrase,
            turn_timeout_seconds: params.turn_timeout.map(|d| d.as_secs()),
            max_ledger_retries: params.max_ledger_retries,
        }
    }
}

impl FileOrchestratorConfig {
    pub fn to_params(&self) -> OrchestratorParams {
        OrchestratorParams::default()
            .with_max_turns(self.max_turns)
            .with_max_stalls(self.max_stalls)
            .with_termination_phrase(self.termination_phrase.clone())
            .with_turn_timeout(self.turn_timeout_seconds.map(Duration::from_secs))
            .with_max_ledger_retries(self.max_ledger_retries)
    }
}
