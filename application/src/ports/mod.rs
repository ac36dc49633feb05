//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod agent;
pub mod code_runner;
pub mod conversation_logger;
pub mod human_input;
pub mod llm_gateway;
pub mod run_observer;
pub mod termination;
