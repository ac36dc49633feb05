//! Agent domain module
//!
//! Roster member identities and the diagnostics produced while assembling
//! and running a roster.

pub mod descriptor;
pub mod validation;

pub use descriptor::{AgentDescriptor, AgentKind, Capability, ORCHESTRATOR_NAME, USER_TASK_SENDER};
pub use validation::{Diagnostic, DiagnosticCode, Severity};
