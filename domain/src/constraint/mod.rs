//! Constrained execution: experiment parameters and the records they produce.

pub mod config;
pub mod record;

pub use config::{ConstraintConfig, ConstraintError, FaultClass, InputType};
pub use record::ExecutionRecord;
