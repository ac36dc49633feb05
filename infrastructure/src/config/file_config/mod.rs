//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain and application
//! types at the edge.

mod constraints;
mod executor;
mod logging;
mod model;
mod orchestrator;
mod output;
mod roster;

pub use constraints::FileConstraintsConfig;
pub use executor::FileExecutorConfig;
pub use logging::FileLoggingConfig;
pub use model::FileModelConfig;
pub use orchestrator::FileOrchestratorConfig;
pub use output::FileOutputConfig;
pub use roster::FileRosterConfig;

use serde::{Deserialize, Serialize};
use taskforce_domain::ConstraintError;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("model.name cannot be empty")]
    EmptyModelName,

    #[error("model.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("orchestrator.termination_phrase cannot be blank")]
    BlankTerminationPhrase,

    #[error("constraints: {0}")]
    Constraint(#[from] ConstraintError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Reasoning client shared by the coordinator and LLM agents
    pub model: FileModelConfig,
    /// Coordinator loop budgets
    pub orchestrator: FileOrchestratorConfig,
    /// Optional team members
    pub roster: FileRosterConfig,
    /// Fault injection parameters
    pub constraints: FileConstraintsConfig,
    /// Local code runner
    pub executor: FileExecutorConfig,
    pub logging: FileLoggingConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.model.name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.model.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if self.model.timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroValue("model.timeout_seconds"));
        }
        if self.orchestrator.max_turns == 0 {
            return Err(ConfigValidationError::ZeroValue("orchestrator.max_turns"));
        }
        if self.orchestrator.max_stalls == 0 {
            return Err(ConfigValidationError::ZeroValue("orchestrator.max_stalls"));
        }
        if let Some(0) = self.orchestrator.turn_timeout_seconds {
            return Err(ConfigValidationError::ZeroValue(
                "orchestrator.turn_timeout_seconds",
            ));
        }
        if self.orchestrator.termination_phrase.trim().is_empty() {
            return Err(ConfigValidationError::BlankTerminationPhrase);
        }
        if self.executor.timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroValue("executor.timeout_seconds"));
        }
        self.constraints.to_constraints()?;
        Ok(())
    }
}
