//! Infrastructure layer for taskforce
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the OpenAI-compatible gateway, the local code runner,
//! the JSONL transcript logger, and configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod runner;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileConstraintsConfig, FileExecutorConfig,
    FileLoggingConfig, FileModelConfig, FileOrchestratorConfig, FileOutputConfig,
    FileRosterConfig,
};
pub use logging::JsonlConversationLogger;
pub use providers::{OpenAiGateway, OpenAiSettings};
pub use runner::LocalCommandRunner;
