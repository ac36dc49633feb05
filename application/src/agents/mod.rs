//! Agent variants
//!
//! - [`LlmAgent`]: file inspector, web navigator, video inspector, code author
//! - [`CodeExecutorAgent`]: runs fenced code blocks via the code runner port
//! - [`ConstraintHarness`]: wraps the executor for fault injection and attempt records
//! - [`HumanProxyAgent`]: relays instructions to a human

pub mod code_executor;
pub mod constraint_harness;
pub mod human_proxy;
pub mod llm_agent;

pub use code_executor::CodeExecutorAgent;
pub use constraint_harness::{ConstraintHarness, ExperimentLog};
pub use human_proxy::HumanProxyAgent;
pub use llm_agent::LlmAgent;
