//! Run observer port.
//!
//! [`RunObserver`] is an **output port** that the presentation layer
//! implements to display coordinator progress as it happens. All callback
//! argument types come from the domain layer.
//!
//! # Callback Categories
//!
//! - **State callbacks**: control-loop state transitions
//! - **Ledger callbacks**: task ledgers (initial and replanned) and per-cycle progress ledgers
//! - **Conversation callbacks**: every appended message
//! - **Recovery callbacks**: stalls and replans
//! - **Diagnostics**: capability warnings, tolerated failures, injected faults
//!
//! # Example Implementation
//!
//! ```ignore
//! use taskforce_application::ports::run_observer::RunObserver;
//!
//! struct MyObserver;
//!
//! impl RunObserver for MyObserver {
//!     fn on_message(&self, message: &Message) {
//!         println!("{}: {}", message.sender, message.content);
//!     }
//! }
//! ```

use taskforce_domain::{
    CoordinatorState, Diagnostic, ExecutionRecord, Message, ProgressLedger, RunStatus, StopReason,
    TaskLedger,
};

/// Observer for a coordinator run.
///
/// All methods have default no-op implementations, so implementers only
/// need to override the callbacks they care about.
pub trait RunObserver: Send + Sync {
    /// Called when the control loop enters a new state
    fn on_state_change(&self, _state: CoordinatorState) {}

    /// Called when a task ledger is created (initially and on every replan)
    fn on_task_ledger(&self, _ledger: &TaskLedger) {}

    /// Called once per evaluation cycle
    fn on_progress_ledger(&self, _ledger: &ProgressLedger) {}

    /// Called for every message appended to the conversation
    fn on_message(&self, _message: &Message) {}

    /// Called on a cycle judged as a stall
    fn on_stall(&self, _count: u32, _max_stalls: u32) {}

    /// Called after a replan, with the new plan version
    fn on_replan(&self, _plan_version: u32) {}

    /// Called for every diagnostic, including roster warnings at run start
    fn on_diagnostic(&self, _diagnostic: &Diagnostic) {}

    /// Called for each code-execution attempt recorded by the constraint harness
    fn on_execution_record(&self, _record: &ExecutionRecord) {}

    /// Called once when the run ends
    fn on_terminated(&self, _status: RunStatus, _reason: &StopReason, _answer: Option<&str>) {}
}

/// No-op observer
pub struct NoRunObserver;

impl RunObserver for NoRunObserver {}
