//! Application-level configuration.
//!
//! - [`OrchestratorParams`]: coordinator loop control (turns, stalls, timeouts, retries)

pub mod orchestrator_params;

pub use orchestrator_params::OrchestratorParams;
