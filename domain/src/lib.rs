//! Domain layer for taskforce
//!
//! This crate contains the core types of the ledger-driven coordinator.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Ledgers
//!
//! The coordinator keeps two ledgers:
//!
//! - **Task Ledger**: facts, educated guesses and a step-by-step plan,
//!   replaced wholesale (with a new version) on every replan
//! - **Progress Ledger**: recomputed each cycle; is the request satisfied,
//!   is the team making progress, is it looping, who speaks next and with
//!   which instruction
//!
//! ## Stalls
//!
//! Consecutive cycles without progress are counted by [`StallCounter`];
//! reaching the threshold triggers a replan.
//!
//! ## Constrained execution
//!
//! [`ConstraintConfig`] lets an operator inject a fault class into code
//! execution on a scheduled attempt and records every attempt as an
//! [`ExecutionRecord`].

pub mod agent;
pub mod constraint;
pub mod conversation;
pub mod core;
pub mod ledger;
pub mod orchestration;
pub mod prompt;

// Re-export commonly used types
pub use agent::{
    descriptor::{AgentDescriptor, AgentKind, Capability, ORCHESTRATOR_NAME, USER_TASK_SENDER},
    validation::{Diagnostic, DiagnosticCode, Severity},
};
pub use constraint::{ConstraintConfig, ConstraintError, ExecutionRecord, FaultClass, InputType};
pub use conversation::{
    CodeBlock, ConversationHistory, Message, MessageKind, extract_code_blocks, since_last,
    transcript,
};
pub use core::{
    model::{ClientCapability, ModelCapabilities, ModelInfo},
    output_format::OutputFormat,
};
pub use ledger::{
    LedgerAnswer, LedgerParseError, ProgressLedger, TaskLedger, TaskLedgerDraft,
    parse_progress_ledger, parse_task_ledger,
};
pub use orchestration::{CoordinatorState, RunStatus, StallCounter, StopReason};
pub use prompt::{AgentPromptTemplate, OrchestratorPromptTemplate};
