//! Ledgers kept by the coordinator.
//!
//! - [`TaskLedger`]: facts, educated guesses and plan, versioned per replan
//! - [`ProgressLedger`]: per-cycle completion/progress/loop assessment
//! - [`parsing`]: extraction of both ledgers from model responses

pub mod parsing;
pub mod progress_ledger;
pub mod task_ledger;

pub use parsing::{LedgerParseError, parse_progress_ledger, parse_task_ledger};
pub use progress_ledger::{LedgerAnswer, ProgressLedger};
pub use task_ledger::{TaskLedger, TaskLedgerDraft};
