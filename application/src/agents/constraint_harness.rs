//! Constraint harness around the code executor.
//!
//! Counts execution attempts, injects the configured fault on the scheduled
//! attempt without running any code, and records every attempt in a shared
//! [`ExperimentLog`].

use crate::ports::agent::{Agent, AgentReply, AgentTurnError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use taskforce_domain::core::string::preview;
use taskforce_domain::{AgentDescriptor, ConstraintConfig, ExecutionRecord, Message};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Shared, append-only log of execution records.
#[derive(Debug, Clone, Default)]
pub struct ExperimentLog {
    records: Arc<Mutex<Vec<ExecutionRecord>>>,
}

impl ExperimentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: ExecutionRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records appended after the first `from` entries.
    pub fn since(&self, from: usize) -> Vec<ExecutionRecord> {
        self.records
            .lock()
            .map(|r| r.iter().skip(from).cloned().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<ExecutionRecord> {
        self.since(0)
    }
}

pub struct ConstraintHarness {
    inner: Arc<dyn Agent>,
    constraints: ConstraintConfig,
    model_family: String,
    attempts: AtomicU32,
    log: ExperimentLog,
}

impl ConstraintHarness {
    pub fn new(
        inner: Arc<dyn Agent>,
        constraints: ConstraintConfig,
        model_family: impl Into<String>,
        log: ExperimentLog,
    ) -> Self {
        Self {
            inner,
            constraints,
            model_family: model_family.into(),
            attempts: AtomicU32::new(0),
            log,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn constraints(&self) -> &ConstraintConfig {
        &self.constraints
    }
}

#[async_trait]
impl Agent for ConstraintHarness {
    fn descriptor(&self) -> &AgentDescriptor {
        self.inner.descriptor()
    }

    async fn handle_turn(
        &self,
        history: &[Message],
        instruction: &str,
        cancellation: &CancellationToken,
    ) -> Result<AgentReply, AgentTurnError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let record = ExecutionRecord::new(attempt, &self.constraints, self.model_family.clone());

        if let Some(fault) = self.constraints.fault_for_attempt(attempt) {
            info!(
                agent = %self.name(),
                attempt,
                injected = true,
                error_type = %fault,
                trial_num = ?self.constraints.trial_num,
                query_num = ?self.constraints.query_num,
                "Injecting scheduled fault"
            );
            self.log.push(record.injected(fault));
            return Err(AgentTurnError::Injected {
                class: fault,
                attempt,
                message: fault.simulated_output().to_string(),
            });
        }

        let result = self.inner.handle_turn(history, instruction, cancellation).await;
        let record = match &result {
            Ok(reply) => record.with_outcome(preview(&reply.content, 200), reply.exit_code),
            Err(e) => record.with_outcome(e.to_string(), None),
        };
        info!(
            agent = %self.name(),
            attempt,
            injected = false,
            exit_code = ?record.exit_code,
            trial_num = ?self.constraints.trial_num,
            query_num = ?self.constraints.query_num,
            "Execution attempt recorded"
        );
        self.log.push(record);
        result
    }
}
