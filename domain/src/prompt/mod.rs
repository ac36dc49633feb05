//! Prompt domain
//!
//! Templates for the coordinator's ledger/final-answer calls and for the
//! roles of LLM-backed agents.

pub mod agent;
pub mod orchestrator;

pub use agent::AgentPromptTemplate;
pub use orchestrator::OrchestratorPromptTemplate;
