//! Per-attempt experiment records.

use super::config::{ConstraintConfig, FaultClass, InputType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One code-execution attempt as seen by the constraint harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// 1-based attempt counter for the run
    pub attempt: u32,
    pub input_type: Option<InputType>,
    pub error_type: Option<FaultClass>,
    pub query_num: Option<u32>,
    pub trial_num: Option<u32>,
    /// Model family of the reasoning client
    pub model_family: String,
    pub injected: bool,
    pub outcome: String,
    pub exit_code: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn new(attempt: u32, constraints: &ConstraintConfig, model_family: impl Into<String>) -> Self {
        Self {
            attempt,
            input_type: constraints.input_type,
            error_type: constraints.error_type,
            query_num: constraints.query_num,
            trial_num: constraints.trial_num,
            model_family: model_family.into(),
            injected: false,
            outcome: String::new(),
            exit_code: None,
            timestamp: Utc::now(),
        }
    }

    pub fn injected(mut self, fault: FaultClass) -> Self {
        self.injected = true;
        self.outcome = format!("injected {}", fault);
        self.exit_code = Some(fault.simulated_exit_code());
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>, exit_code: Option<i32>) -> Self {
        self.outcome = outcome.into();
        self.exit_code = exit_code;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_passes_counters_through() {
        let cfg = ConstraintConfig {
            input_type: Some(InputType::File),
            error_type: Some(FaultClass::Timeout),
            query_num: Some(2),
            trial_num: Some(7),
        };
        let record = ExecutionRecord::new(2, &cfg, "gpt-4o").injected(FaultClass::Timeout);
        assert!(record.injected);
        assert_eq!(record.trial_num, Some(7));
        assert_eq!(record.query_num, Some(2));
        assert_eq!(record.exit_code, Some(124));
        assert_eq!(record.outcome, "injected timeout");
    }
}
