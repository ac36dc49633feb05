//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod assemble_roster;
pub mod run_orchestrator;
pub(crate) mod shared;
