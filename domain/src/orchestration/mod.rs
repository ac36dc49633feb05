//! Coordinator control-loop concepts: states, run outcomes and stall counting.

pub mod stall;
pub mod state;

pub use stall::StallCounter;
pub use state::{CoordinatorState, RunStatus, StopReason};
