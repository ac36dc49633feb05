//! Run events for the streaming entry point.

use super::types::{RunError, RunOutput};
use crate::ports::run_observer::RunObserver;
use taskforce_domain::{
    CoordinatorState, Diagnostic, ExecutionRecord, Message, ProgressLedger, RunStatus, StopReason,
    TaskLedger,
};
use tokio::sync::mpsc;

/// One observable step of a run, as yielded by `Coordinator::run_stream`.
#[derive(Debug, Clone)]
pub enum RunEvent {
    StateChanged(CoordinatorState),
    TaskLedger(TaskLedger),
    ProgressLedger(ProgressLedger),
    Message(Message),
    Stalled { count: u32, max_stalls: u32 },
    Replanned { plan_version: u32 },
    Diagnostic(Diagnostic),
    ExecutionRecord(ExecutionRecord),
    /// Always the last event of a stream
    Terminated(Result<Box<RunOutput>, RunError>),
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Terminated(_))
    }
}

/// Observer that forwards callbacks into an unbounded channel.
///
/// Send errors (receiver dropped) are ignored; the run continues.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }
}

impl RunObserver for ChannelObserver {
    fn on_state_change(&self, state: CoordinatorState) {
        self.send(RunEvent::StateChanged(state));
    }

    fn on_task_ledger(&self, ledger: &TaskLedger) {
        self.send(RunEvent::TaskLedger(ledger.clone()));
    }

    fn on_progress_ledger(&self, ledger: &ProgressLedger) {
        self.send(RunEvent::ProgressLedger(ledger.clone()));
    }

    fn on_message(&self, message: &Message) {
        self.send(RunEvent::Message(message.clone()));
    }

    fn on_stall(&self, count: u32, max_stalls: u32) {
        self.send(RunEvent::Stalled { count, max_stalls });
    }

    fn on_replan(&self, plan_version: u32) {
        self.send(RunEvent::Replanned { plan_version });
    }

    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        self.send(RunEvent::Diagnostic(diagnostic.clone()));
    }

    fn on_execution_record(&self, record: &ExecutionRecord) {
        self.send(RunEvent::ExecutionRecord(record.clone()));
    }

    // Terminated is sent by the stream driver with the full output.
    fn on_terminated(&self, _status: RunStatus, _reason: &StopReason, _answer: Option<&str>) {}
}
