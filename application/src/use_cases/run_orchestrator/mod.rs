//! Run Orchestrator use case
//!
//! The coordinator's control loop. One agent turn is in flight at a time;
//! the loop alternates between evaluating progress and dispatching the
//! nominated agent, and replans after repeated stalls.
//!
//! ```text
//! Planning ──▶ Evaluating ──▶ Dispatching ──┐
//!                 ▲   │  ▲                   │
//!                 │   │  └───────────────────┘
//!                 │   ▼
//!              Replanning        Evaluating ──▶ Terminated
//! ```
//!
//! | Outcome                          | Status     | Final answer        |
//! |----------------------------------|------------|---------------------|
//! | Progress ledger: satisfied       | Complete   | synthesized         |
//! | Termination phrase mentioned     | Complete   | synthesized         |
//! | `max_turns` dispatches reached   | Incomplete | last agent reply    |
//! | Ledger calls keep failing        | Incomplete | last agent reply    |
//! | Cancellation                     | Cancelled  | none                |

mod events;
pub mod ledger;
mod types;

pub use events::{ChannelObserver, RunEvent};
pub use ledger::{
    AnswerSynthesizer, LedgerError, LlmAnswerSynthesizer, LlmProgressLedgerEvaluator,
    LlmTaskLedgerBuilder, ProgressLedgerEvaluator, TaskLedgerBuilder,
};
pub use types::{ConfigurationError, RunError, RunOutput};

use crate::agents::ExperimentLog;
use crate::config::OrchestratorParams;
use crate::ports::agent::{Agent, AgentReply, AgentTurnError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::run_observer::{NoRunObserver, RunObserver};
use crate::ports::termination::{TerminationCondition, TextMentionTermination};
use crate::use_cases::assemble_roster::Roster;
use crate::use_cases::shared::{cancellable, is_cancelled};
use futures::Stream;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use taskforce_domain::core::string::preview;
use taskforce_domain::{
    ConversationHistory, CoordinatorState, Diagnostic, DiagnosticCode, ExecutionRecord, Message,
    MessageKind, ORCHESTRATOR_NAME, ProgressLedger, RunStatus, StallCounter, StopReason,
    TaskLedger, USER_TASK_SENDER,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of a ledger call after retries
enum LedgerOutcome<T> {
    Ready(T),
    Exhausted(LedgerError),
    Cancelled,
}

/// Mutable state of one run. Single writer: the control loop.
struct RunState<'a> {
    observer: &'a dyn RunObserver,
    logger: &'a dyn ConversationLogger,
    history: ConversationHistory,
    diagnostics: Vec<Diagnostic>,
    task_ledger: Option<TaskLedger>,
    progress_ledgers: Vec<ProgressLedger>,
    execution_records: Vec<ExecutionRecord>,
    record_cursor: usize,
    turns: u32,
    replans: u32,
}

impl<'a> RunState<'a> {
    fn new(
        observer: &'a dyn RunObserver,
        logger: &'a dyn ConversationLogger,
        record_cursor: usize,
    ) -> Self {
        Self {
            observer,
            logger,
            history: ConversationHistory::new(),
            diagnostics: Vec::new(),
            task_ledger: None,
            progress_ledgers: Vec::new(),
            execution_records: Vec::new(),
            record_cursor,
            turns: 0,
            replans: 0,
        }
    }

    fn set_state(&self, state: CoordinatorState) {
        debug!(state = %state, "Coordinator state");
        self.observer.on_state_change(state);
    }

    fn append(&mut self, sender: &str, kind: MessageKind, content: impl Into<String>) -> Message {
        let message = self.history.append(sender, kind, content);
        self.observer.on_message(&message);
        self.logger.log(ConversationEvent::new(
            "message",
            serde_json::to_value(&message).unwrap_or_default(),
        ));
        message
    }

    fn diagnostic(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.observer.on_diagnostic(&diagnostic);
        self.logger.log(ConversationEvent::new(
            "diagnostic",
            serde_json::to_value(&diagnostic).unwrap_or_default(),
        ));
        self.diagnostics.push(diagnostic);
    }

    fn adopt_ledger(&mut self, ledger: TaskLedger, task: &str, team: &str) {
        self.observer.on_task_ledger(&ledger);
        self.logger.log(ConversationEvent::new(
            "task_ledger",
            serde_json::to_value(&ledger).unwrap_or_default(),
        ));
        self.append(ORCHESTRATOR_NAME, MessageKind::Ledger, ledger.render(task, team));
        self.task_ledger = Some(ledger);
    }

    fn record_progress(&mut self, progress: &ProgressLedger) {
        debug!(
            plan_version = progress.plan_version,
            complete = progress.is_complete(),
            progress = progress.is_making_progress(),
            looping = progress.is_looping(),
            next_speaker = %progress.next_speaker(),
            "Progress ledger"
        );
        self.observer.on_progress_ledger(progress);
        self.logger.log(ConversationEvent::new(
            "progress_ledger",
            serde_json::to_value(progress).unwrap_or_default(),
        ));
        self.progress_ledgers.push(progress.clone());
    }

    fn collect_records(&mut self, log: &ExperimentLog) {
        let fresh = log.since(self.record_cursor);
        self.record_cursor += fresh.len();
        for record in fresh {
            self.observer.on_execution_record(&record);
            self.logger.log(ConversationEvent::new(
                "execution_record",
                serde_json::to_value(&record).unwrap_or_default(),
            ));
            self.execution_records.push(record);
        }
    }

    fn last_agent_reply(&self) -> Option<String> {
        self.history.last_agent_reply().map(|m| m.content.clone())
    }
}

/// Lead coordinator: plans, dispatches, monitors progress and recovers from stalls.
pub struct Coordinator {
    roster: Roster,
    ledger_builder: Arc<dyn TaskLedgerBuilder>,
    evaluator: Arc<dyn ProgressLedgerEvaluator>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    termination: Option<Arc<dyn TerminationCondition>>,
    params: OrchestratorParams,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl Coordinator {
    /// Coordinator whose ledgers and final answer come from `gateway`
    pub fn new(roster: Roster, gateway: Arc<dyn LlmGateway>) -> Self {
        Self::with_components(
            roster,
            Arc::new(LlmTaskLedgerBuilder::new(gateway.clone())),
            Arc::new(LlmProgressLedgerEvaluator::new(gateway.clone())),
            Arc::new(LlmAnswerSynthesizer::new(gateway)),
        )
    }

    /// Coordinator with explicit ledger components
    pub fn with_components(
        roster: Roster,
        ledger_builder: Arc<dyn TaskLedgerBuilder>,
        evaluator: Arc<dyn ProgressLedgerEvaluator>,
        synthesizer: Arc<dyn AnswerSynthesizer>,
    ) -> Self {
        Self {
            roster,
            ledger_builder,
            evaluator,
            synthesizer,
            termination: None,
            params: OrchestratorParams::default(),
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: OrchestratorParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the default `TextMentionTermination(termination_phrase)`
    pub fn with_termination(mut self, condition: Arc<dyn TerminationCondition>) -> Self {
        self.termination = Some(condition);
        self
    }

    /// Set a conversation logger for JSONL transcript output
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn params(&self) -> &OrchestratorParams {
        &self.params
    }

    /// Run to completion without observing intermediate steps.
    pub async fn run(&self, task: &str) -> Result<RunOutput, RunError> {
        self.execute_with_observer(task, &NoRunObserver).await
    }

    /// Run on a spawned task and yield every step as a [`RunEvent`].
    ///
    /// The stream always ends with [`RunEvent::Terminated`].
    pub fn run_stream(self, task: impl Into<String>) -> impl Stream<Item = RunEvent> + Send + 'static {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = task.into();
        tokio::spawn(async move {
            let observer = ChannelObserver::new(tx.clone());
            let result = self.execute_with_observer(&task, &observer).await;
            let _ = tx.send(RunEvent::Terminated(result.map(Box::new)));
        });
        futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
    }

    /// Run to completion, reporting each step to `observer`.
    pub async fn execute_with_observer(
        &self,
        task: &str,
        observer: &dyn RunObserver,
    ) -> Result<RunOutput, RunError> {
        let task = task.trim();
        self.validate(task)?;

        let termination = self.termination_condition();
        termination.reset();

        info!(
            agents = ?self.roster.names(),
            max_turns = self.params.max_turns,
            max_stalls = self.params.max_stalls,
            "Starting run: {}",
            preview(task, 80)
        );
        self.conversation_logger.log(ConversationEvent::new(
            "run_started",
            json!({
                "task": task,
                "agents": self.roster.names(),
                "max_turns": self.params.max_turns,
                "max_stalls": self.params.max_stalls,
            }),
        ));

        let mut run = RunState::new(
            observer,
            self.conversation_logger.as_ref(),
            self.roster.experiment_log().len(),
        );
        for diagnostic in self.roster.diagnostics() {
            run.diagnostic(diagnostic.clone());
        }

        let stop = self.drive(task, &mut run, termination.as_ref()).await?;
        Ok(self.finish(task, run, stop).await)
    }

    fn validate(&self, task: &str) -> Result<(), ConfigurationError> {
        if task.is_empty() {
            return Err(ConfigurationError::EmptyTask);
        }
        if self.params.max_turns == 0 {
            return Err(ConfigurationError::ZeroBudget("max_turns"));
        }
        if self.params.max_stalls == 0 {
            return Err(ConfigurationError::ZeroBudget("max_stalls"));
        }
        Ok(())
    }

    fn termination_condition(&self) -> Arc<dyn TerminationCondition> {
        match &self.termination {
            Some(condition) => condition.clone(),
            None => Arc::new(TextMentionTermination::new(
                self.params.termination_phrase.clone(),
            )),
        }
    }

    /// The control loop. Returns why the run stopped; configuration errors
    /// abort before the offending dispatch.
    async fn drive(
        &self,
        task: &str,
        run: &mut RunState<'_>,
        termination: &dyn TerminationCondition,
    ) -> Result<StopReason, RunError> {
        let team = self.roster.descriptors();
        let team_ref = &team[..];
        let team_text = self.roster.team_description();

        // ==================== Planning ====================
        run.set_state(CoordinatorState::Planning);
        run.append(USER_TASK_SENDER, MessageKind::Task, task);

        let mut retries = Vec::new();
        let outcome = self
            .call_ledger("task ledger", &mut retries, move || {
                self.ledger_builder.build(task, team_ref, None, &[])
            })
            .await;
        for d in retries {
            run.diagnostic(d);
        }
        let mut ledger = match outcome {
            LedgerOutcome::Ready(draft) => TaskLedger::initial(draft),
            LedgerOutcome::Cancelled => return Ok(StopReason::Cancelled),
            LedgerOutcome::Exhausted(e) => {
                warn!(error = %e, "Planning failed");
                return Ok(StopReason::PlanningFailed);
            }
        };
        info!(plan_version = ledger.version(), steps = ledger.plan().len(), "Task ledger ready");
        run.adopt_ledger(ledger.clone(), task, &team_text);

        let mut stalls = StallCounter::new(self.params.max_stalls);
        let mut last_turn_failed = false;

        loop {
            if is_cancelled(&self.cancellation_token) {
                return Ok(StopReason::Cancelled);
            }

            // ==================== Evaluating ====================
            run.set_state(CoordinatorState::Evaluating);
            let mut retries = Vec::new();
            let outcome = {
                let ledger_ref = &ledger;
                let snapshot = run.history.snapshot();
                self.call_ledger("progress ledger", &mut retries, move || {
                    self.evaluator.evaluate(task, ledger_ref, snapshot, team_ref)
                })
                .await
            };
            for d in retries {
                run.diagnostic(d);
            }
            let progress = match outcome {
                LedgerOutcome::Ready(progress) => progress.stamped(ledger.version()),
                LedgerOutcome::Cancelled => return Ok(StopReason::Cancelled),
                LedgerOutcome::Exhausted(e) => {
                    warn!(error = %e, "Progress ledger unavailable");
                    return Ok(StopReason::LedgerUnavailable);
                }
            };
            run.record_progress(&progress);

            if progress.is_complete() {
                info!(reason = %progress.is_request_satisfied.reason, "Request satisfied");
                return Ok(StopReason::RequestSatisfied);
            }

            let stalled = progress.signals_stall() || last_turn_failed;
            let count = stalls.observe(stalled);
            if stalled {
                info!(count, max_stalls = stalls.max_stalls(), "Stall detected");
                run.observer.on_stall(count, stalls.max_stalls());
            }

            // ==================== Replanning ====================
            if stalls.should_replan() {
                run.set_state(CoordinatorState::Replanning);
                let mut retries = Vec::new();
                let outcome = {
                    let prior = &ledger;
                    let snapshot = run.history.snapshot();
                    self.call_ledger("replan", &mut retries, move || {
                        self.ledger_builder.build(task, team_ref, Some(prior), snapshot)
                    })
                    .await
                };
                for d in retries {
                    run.diagnostic(d);
                }
                let draft = match outcome {
                    LedgerOutcome::Ready(draft) => draft,
                    LedgerOutcome::Cancelled => return Ok(StopReason::Cancelled),
                    LedgerOutcome::Exhausted(e) => {
                        warn!(error = %e, "Replanning failed");
                        return Ok(StopReason::LedgerUnavailable);
                    }
                };
                ledger = ledger.succeed(draft);
                stalls.reset();
                last_turn_failed = false;
                run.replans += 1;
                info!(plan_version = ledger.version(), "Replanned");
                run.observer.on_replan(ledger.version());
                self.conversation_logger.log(ConversationEvent::new(
                    "replan",
                    json!({ "plan_version": ledger.version(), "turns": run.turns }),
                ));
                run.adopt_ledger(ledger.clone(), task, &team_text);
                continue;
            }

            // ==================== Dispatching ====================
            run.set_state(CoordinatorState::Dispatching);
            let Some(agent) = self.roster.get(progress.next_speaker()).cloned() else {
                return Err(ConfigurationError::UnknownAgent {
                    name: progress.next_speaker().to_string(),
                    available: self.roster.names().join(", "),
                }
                .into());
            };
            let instruction = progress.instruction().to_string();
            let mark = run.history.len();
            run.append(ORCHESTRATOR_NAME, MessageKind::Instruction, instruction.as_str());
            run.turns += 1;
            info!(
                turn = run.turns,
                agent = %agent.name(),
                "Dispatching: {}",
                preview(&instruction, 80)
            );

            let result = self
                .dispatch(agent.as_ref(), run.history.snapshot(), &instruction)
                .await;
            run.collect_records(self.roster.experiment_log());

            match result {
                Ok(reply) => {
                    run.append(agent.name(), MessageKind::AgentReply, reply.content);
                    last_turn_failed = false;
                }
                Err(AgentTurnError::Cancelled) => return Ok(StopReason::Cancelled),
                Err(e) => {
                    let (kind, code) = if e.is_injected() {
                        (MessageKind::InjectedFault, DiagnosticCode::InjectedFault)
                    } else {
                        (MessageKind::AgentFailure, DiagnosticCode::AgentTurnFailed)
                    };
                    run.append(agent.name(), kind, e.to_string());
                    run.diagnostic(Diagnostic::warning(
                        code,
                        format!("{} turn {} failed: {}", agent.name(), run.turns, e),
                    ));
                    last_turn_failed = true;
                }
            }

            if let Some(reason) = termination.check(run.history.since(mark)) {
                info!(reason = %reason, "Termination condition met");
                return Ok(StopReason::TerminationCondition(reason));
            }
            if run.turns >= self.params.max_turns {
                warn!(max_turns = self.params.max_turns, "Turn budget exhausted");
                return Ok(StopReason::MaxTurnsReached);
            }
        }
    }

    /// Await one ledger call with cancellation, retrying failures up to
    /// `max_ledger_retries` times. Each retry is reported in `retries`.
    async fn call_ledger<T, F, Fut>(
        &self,
        what: &str,
        retries: &mut Vec<Diagnostic>,
        mut call: F,
    ) -> LedgerOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let attempts = self.params.ledger_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match cancellable(&self.cancellation_token, call()).await {
                None => return LedgerOutcome::Cancelled,
                Some(Ok(value)) => return LedgerOutcome::Ready(value),
                Some(Err(e)) if attempt < attempts => {
                    retries.push(Diagnostic::warning(
                        DiagnosticCode::LedgerRetry,
                        format!("{} failed (attempt {}/{}): {}", what, attempt, attempts, e),
                    ));
                }
                Some(Err(e)) => return LedgerOutcome::Exhausted(e),
            }
        }
    }

    /// One agent turn, raced against cancellation and the optional turn timeout.
    async fn dispatch(
        &self,
        agent: &dyn Agent,
        history: &[Message],
        instruction: &str,
    ) -> Result<AgentReply, AgentTurnError> {
        let token = self
            .cancellation_token
            .clone()
            .unwrap_or_else(CancellationToken::new);
        let turn = agent.handle_turn(history, instruction, &token);
        let outcome = match self.params.turn_timeout {
            Some(limit) => cancellable(&self.cancellation_token, tokio::time::timeout(limit, turn))
                .await
                .map(|timed| timed.unwrap_or_else(|_| Err(AgentTurnError::Timeout(limit)))),
            None => cancellable(&self.cancellation_token, turn).await,
        };
        outcome.unwrap_or(Err(AgentTurnError::Cancelled))
    }

    async fn finish(&self, task: &str, mut run: RunState<'_>, stop: StopReason) -> RunOutput {
        run.set_state(CoordinatorState::Terminated);
        let mut stop = stop;

        let answer = match stop.status() {
            RunStatus::Complete => {
                let synthesized = cancellable(
                    &self.cancellation_token,
                    self.synthesizer.synthesize(task, run.history.snapshot()),
                )
                .await;
                match synthesized {
                    Some(Ok(answer)) => Some(answer),
                    Some(Err(e)) => {
                        run.diagnostic(Diagnostic::warning(
                            DiagnosticCode::SynthesisFallback,
                            format!("final answer synthesis failed, using last agent reply: {}", e),
                        ));
                        run.last_agent_reply()
                    }
                    None => {
                        stop = StopReason::Cancelled;
                        None
                    }
                }
            }
            RunStatus::Incomplete => run.last_agent_reply(),
            RunStatus::Cancelled => None,
        };
        if stop.status() == RunStatus::Complete
            && let Some(answer) = &answer
        {
            run.append(ORCHESTRATOR_NAME, MessageKind::FinalAnswer, answer.as_str());
        }

        let status = stop.status();
        info!(
            status = %status,
            reason = %stop,
            turns = run.turns,
            replans = run.replans,
            "Run finished"
        );
        run.observer.on_terminated(status, &stop, answer.as_deref());
        self.conversation_logger.log(ConversationEvent::new(
            "run_finished",
            json!({
                "status": status,
                "stop_reason": stop,
                "turns": run.turns,
                "replans": run.replans,
                "answer": answer,
            }),
        ));

        RunOutput {
            status,
            stop_reason: stop,
            answer,
            task_ledger: run.task_ledger,
            progress_ledgers: run.progress_ledgers,
            history: run.history.into_messages(),
            diagnostics: run.diagnostics,
            execution_records: run.execution_records,
            turns: run.turns,
            replans: run.replans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ConstraintHarness;
    use crate::ports::llm_gateway::{GatewayError, LlmSession};
    use crate::ports::termination::NoTermination;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use taskforce_domain::{
        AgentDescriptor, AgentKind, ConstraintConfig, FaultClass, LedgerAnswer, ModelInfo,
        TaskLedgerDraft,
    };

    // ==================== Flow Test Infrastructure ====================

    fn progress(complete: bool, making_progress: bool, looping: bool, speaker: &str, instruction: &str) -> ProgressLedger {
        ProgressLedger {
            is_request_satisfied: LedgerAnswer::new(complete, "scripted"),
            is_progress_being_made: LedgerAnswer::new(making_progress, "scripted"),
            is_in_loop: LedgerAnswer::new(looping, "scripted"),
            next_speaker: LedgerAnswer::new(speaker.to_string(), "scripted"),
            instruction_or_question: LedgerAnswer::new(instruction.to_string(), "scripted"),
            plan_version: 0,
        }
    }

    fn keep_going(speaker: &str) -> ProgressLedger {
        progress(false, true, false, speaker, "keep going")
    }

    fn stalled(speaker: &str) -> ProgressLedger {
        progress(false, false, false, speaker, "try something else")
    }

    fn done() -> ProgressLedger {
        progress(true, true, false, "FileSurfer", "")
    }

    fn plan(steps: &[&str]) -> TaskLedgerDraft {
        TaskLedgerDraft {
            facts: vec!["scripted fact".to_string()],
            guesses: vec![],
            plan: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn ledger_failure() -> LedgerError {
        LedgerError::Gateway(GatewayError::RequestFailed("scripted failure".to_string()))
    }

    /// Task ledger builder returning scripted drafts in order
    struct ScriptedBuilder {
        script: Mutex<VecDeque<Result<TaskLedgerDraft, LedgerError>>>,
        /// Version of `prior` for each call (None for the initial ledger)
        calls: Mutex<Vec<Option<u32>>>,
    }

    impl ScriptedBuilder {
        fn new(script: Vec<Result<TaskLedgerDraft, LedgerError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Option<u32>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskLedgerBuilder for ScriptedBuilder {
        async fn build(
            &self,
            _task: &str,
            _team: &[AgentDescriptor],
            prior: Option<&TaskLedger>,
            _history: &[Message],
        ) -> Result<TaskLedgerDraft, LedgerError> {
            self.calls.lock().unwrap().push(prior.map(TaskLedger::version));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(plan(&["continue"])))
        }
    }

    /// Progress evaluator returning scripted ledgers, then a fallback forever
    struct ScriptedEvaluator {
        script: Mutex<VecDeque<Result<ProgressLedger, LedgerError>>>,
        fallback: Result<ProgressLedger, LedgerError>,
        /// Plan version each evaluation was made against
        versions: Mutex<Vec<u32>>,
    }

    impl ScriptedEvaluator {
        fn new(script: Vec<Result<ProgressLedger, LedgerError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: Ok(keep_going("Coder")),
                versions: Mutex::new(Vec::new()),
            }
        }

        fn with_fallback(mut self, fallback: Result<ProgressLedger, LedgerError>) -> Self {
            self.fallback = fallback;
            self
        }

        fn calls(&self) -> usize {
            self.versions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProgressLedgerEvaluator for ScriptedEvaluator {
        async fn evaluate(
            &self,
            _task: &str,
            ledger: &TaskLedger,
            _history: &[Message],
            _team: &[AgentDescriptor],
        ) -> Result<ProgressLedger, LedgerError> {
            self.versions.lock().unwrap().push(ledger.version());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone())
        }
    }

    struct ScriptedSynthesizer {
        result: Result<String, LedgerError>,
        calls: Mutex<usize>,
        /// Cancel this token and hang instead of answering
        hang_and_cancel: Option<CancellationToken>,
    }

    impl ScriptedSynthesizer {
        fn new(result: Result<String, LedgerError>) -> Self {
            Self {
                result,
                calls: Mutex::new(0),
                hang_and_cancel: None,
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl AnswerSynthesizer for ScriptedSynthesizer {
        async fn synthesize(&self, _task: &str, _history: &[Message]) -> Result<String, LedgerError> {
            *self.calls.lock().unwrap() += 1;
            if let Some(token) = &self.hang_and_cancel {
                token.cancel();
                return std::future::pending().await;
            }
            self.result.clone()
        }
    }

    /// Agent that answers from a script, then with "ok"
    struct ScriptedAgent {
        descriptor: AgentDescriptor,
        replies: Mutex<VecDeque<Result<AgentReply, AgentTurnError>>>,
        instructions: Mutex<Vec<String>>,
        /// Cancel this token and hang on the first turn
        hang_and_cancel: Option<CancellationToken>,
    }

    impl ScriptedAgent {
        fn new(kind: AgentKind, replies: Vec<Result<AgentReply, AgentTurnError>>) -> Self {
            Self {
                descriptor: AgentDescriptor::for_kind(kind),
                replies: Mutex::new(replies.into()),
                instructions: Mutex::new(Vec::new()),
                hang_and_cancel: None,
            }
        }

        fn calls(&self) -> usize {
            self.instructions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Agent for ScriptedAgent {
        fn descriptor(&self) -> &AgentDescriptor {
            &self.descriptor
        }

        async fn handle_turn(
            &self,
            _history: &[Message],
            instruction: &str,
            _cancellation: &CancellationToken,
        ) -> Result<AgentReply, AgentTurnError> {
            self.instructions
                .lock()
                .unwrap()
                .push(instruction.to_string());
            if let Some(token) = &self.hang_and_cancel {
                token.cancel();
                return std::future::pending().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(AgentReply::text("ok")))
        }
    }

    /// Observer recording stalls, replans, states and terminations
    #[derive(Default)]
    struct TrackingObserver {
        states: Mutex<Vec<CoordinatorState>>,
        stalls: Mutex<Vec<u32>>,
        replans: Mutex<Vec<u32>>,
        messages: Mutex<Vec<u64>>,
        terminated: Mutex<Vec<RunStatus>>,
    }

    impl RunObserver for TrackingObserver {
        fn on_state_change(&self, state: CoordinatorState) {
            self.states.lock().unwrap().push(state);
        }

        fn on_stall(&self, count: u32, _max_stalls: u32) {
            self.stalls.lock().unwrap().push(count);
        }

        fn on_replan(&self, plan_version: u32) {
            self.replans.lock().unwrap().push(plan_version);
        }

        fn on_message(&self, message: &Message) {
            self.messages.lock().unwrap().push(message.sequence);
        }

        fn on_terminated(&self, status: RunStatus, _reason: &StopReason, _answer: Option<&str>) {
            self.terminated.lock().unwrap().push(status);
        }
    }

    struct FlowResult {
        result: Result<RunOutput, RunError>,
        observer: TrackingObserver,
        file_surfer: Arc<ScriptedAgent>,
        coder: Arc<ScriptedAgent>,
        executor: Arc<ScriptedAgent>,
        builder: Arc<ScriptedBuilder>,
        evaluator: Arc<ScriptedEvaluator>,
        synthesizer: Arc<ScriptedSynthesizer>,
    }

    impl FlowResult {
        fn output(&self) -> &RunOutput {
            self.result.as_ref().expect("run should succeed")
        }
    }

    /// Builder for configuring and executing flow tests
    struct FlowTestBuilder {
        file_surfer: ScriptedAgent,
        coder: ScriptedAgent,
        executor: ScriptedAgent,
        constraints: Option<ConstraintConfig>,
        builder: ScriptedBuilder,
        evaluator: ScriptedEvaluator,
        synthesizer: ScriptedSynthesizer,
        params: OrchestratorParams,
        token: Option<CancellationToken>,
        termination: Option<Arc<dyn TerminationCondition>>,
    }

    impl FlowTestBuilder {
        /// FileSurfer, Coder, Executor with an always-working ledger
        fn standard() -> Self {
            Self {
                file_surfer: ScriptedAgent::new(AgentKind::FileInspector, vec![]),
                coder: ScriptedAgent::new(AgentKind::CodeAuthor, vec![]),
                executor: ScriptedAgent::new(AgentKind::CodeExecutor, vec![]),
                constraints: None,
                builder: ScriptedBuilder::new(vec![Ok(plan(&["ask the team"]))]),
                evaluator: ScriptedEvaluator::new(vec![]),
                synthesizer: ScriptedSynthesizer::new(Ok("synthesized answer".to_string())),
                params: OrchestratorParams::default(),
                token: None,
                termination: None,
            }
        }

        fn evaluations(mut self, script: Vec<Result<ProgressLedger, LedgerError>>) -> Self {
            let fallback = self.evaluator.fallback.clone();
            self.evaluator = ScriptedEvaluator::new(script).with_fallback(fallback);
            self
        }

        fn evaluation_fallback(mut self, fallback: Result<ProgressLedger, LedgerError>) -> Self {
            self.evaluator.fallback = fallback;
            self
        }

        fn params(mut self, params: OrchestratorParams) -> Self {
            self.params = params;
            self
        }

        async fn execute(self, task: &str) -> FlowResult {
            let file_surfer = Arc::new(self.file_surfer);
            let coder = Arc::new(self.coder);
            let executor = Arc::new(self.executor);
            let log = ExperimentLog::new();

            let executor_agent: Arc<dyn Agent> = match self.constraints {
                Some(constraints) => Arc::new(ConstraintHarness::new(
                    executor.clone(),
                    constraints,
                    "gpt-4o",
                    log.clone(),
                )),
                None => executor.clone(),
            };
            let agents: Vec<Arc<dyn Agent>> =
                vec![file_surfer.clone(), coder.clone(), executor_agent];
            let roster = Roster::from_agents(agents, false)
                .unwrap()
                .with_experiment_log(log);

            let builder = Arc::new(self.builder);
            let evaluator = Arc::new(self.evaluator);
            let synthesizer = Arc::new(self.synthesizer);
            let mut coordinator = Coordinator::with_components(
                roster,
                builder.clone(),
                evaluator.clone(),
                synthesizer.clone(),
            )
            .with_params(self.params);
            if let Some(token) = self.token {
                coordinator = coordinator.with_cancellation(token);
            }
            if let Some(termination) = self.termination {
                coordinator = coordinator.with_termination(termination);
            }

            let observer = TrackingObserver::default();
            let result = coordinator.execute_with_observer(task, &observer).await;

            FlowResult {
                result,
                observer,
                file_surfer,
                coder,
                executor,
                builder,
                evaluator,
                synthesizer,
            }
        }
    }

    /// Gateway whose sessions answer from one queue and record every prompt
    struct RecordingGateway {
        info: ModelInfo,
        responses: Arc<Mutex<VecDeque<String>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingGateway {
        fn new(responses: Vec<String>) -> Self {
            Self {
                info: ModelInfo::new("gpt-4o", "openai"),
                responses: Arc::new(Mutex::new(responses.into())),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    struct RecordingSession {
        responses: Arc<Mutex<VecDeque<String>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LlmSession for RecordingSession {
        async fn send(&self, content: &str) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(content.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("no scripted response".into()))
        }
    }

    #[async_trait]
    impl LlmGateway for RecordingGateway {
        fn model_info(&self) -> &ModelInfo {
            &self.info
        }

        async fn create_session(&self) -> Result<Box<dyn LlmSession>, GatewayError> {
            Ok(Box::new(RecordingSession {
                responses: self.responses.clone(),
                prompts: self.prompts.clone(),
            }))
        }

        async fn create_session_with_system_prompt(
            &self,
            _system_prompt: &str,
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            self.create_session().await
        }
    }

    fn progress_json(complete: bool, making_progress: bool, speaker: &str) -> String {
        serde_json::json!({
            "is_request_satisfied": {"reason": "r", "answer": complete},
            "is_in_loop": {"reason": "r", "answer": false},
            "is_progress_being_made": {"reason": "r", "answer": making_progress},
            "next_speaker": {"reason": "r", "answer": speaker},
            "instruction_or_question": {"reason": "r", "answer": "try something else"}
        })
        .to_string()
    }

    fn standard_agents() -> Vec<Arc<dyn Agent>> {
        vec![
            Arc::new(ScriptedAgent::new(AgentKind::FileInspector, vec![])),
            Arc::new(ScriptedAgent::new(AgentKind::CodeAuthor, vec![])),
            Arc::new(ScriptedAgent::new(AgentKind::CodeExecutor, vec![])),
        ]
    }

    fn kinds(output: &RunOutput) -> Vec<MessageKind> {
        output.history.iter().map(|m| m.kind).collect()
    }

    // ==================== Flow Tests ====================

    #[tokio::test]
    async fn test_single_dispatch_then_complete() {
        let mut flow = FlowTestBuilder::standard().evaluations(vec![
            Ok(progress(false, true, false, "FileSurfer", "List the files in /tmp")),
            Ok(done()),
        ]);
        flow.file_surfer = ScriptedAgent::new(
            AgentKind::FileInspector,
            vec![Ok(AgentReply::text("done: 3 files"))],
        );
        let r = flow.execute("list files in /tmp").await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Complete);
        assert_eq!(output.stop_reason, StopReason::RequestSatisfied);
        assert_eq!(output.turns, 1);
        assert_eq!(r.file_surfer.calls(), 1);
        assert_eq!(r.coder.calls(), 0);
        assert_eq!(output.answer.as_deref(), Some("synthesized answer"));
        assert_eq!(
            kinds(output),
            vec![
                MessageKind::Task,
                MessageKind::Ledger,
                MessageKind::Instruction,
                MessageKind::AgentReply,
                MessageKind::FinalAnswer,
            ]
        );
        assert_eq!(output.history[2].sender, ORCHESTRATOR_NAME);
        assert_eq!(output.history[3].content, "done: 3 files");
        assert!(output.history.windows(2).all(|w| w[0].sequence < w[1].sequence));
        assert_eq!(r.observer.messages.lock().unwrap().len(), output.history.len());
        assert_eq!(
            r.observer.terminated.lock().unwrap().clone(),
            vec![RunStatus::Complete]
        );
    }

    #[tokio::test]
    async fn test_consecutive_stalls_trigger_exactly_one_replan() {
        let r = FlowTestBuilder::standard()
            .evaluations(vec![
                Ok(stalled("Coder")),
                Ok(stalled("Coder")),
                Ok(stalled("Coder")),
                Ok(done()),
            ])
            .params(OrchestratorParams::default().with_max_stalls(3))
            .execute("summarize the report")
            .await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Complete);
        assert_eq!(output.replans, 1);
        // third stall replans instead of dispatching
        assert_eq!(output.turns, 2);
        assert_eq!(r.builder.calls(), vec![None, Some(1)]);
        assert_eq!(*r.observer.stalls.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(*r.observer.replans.lock().unwrap(), vec![2]);
        assert_eq!(output.plan_version(), 2);
        // the 4th cycle is evaluated against the new plan
        let versions: Vec<u32> = output.progress_ledgers.iter().map(|p| p.plan_version).collect();
        assert_eq!(versions, vec![1, 1, 1, 2]);
        assert_eq!(*r.evaluator.versions.lock().unwrap(), vec![1, 1, 1, 2]);
    }

    #[tokio::test]
    async fn test_progress_resets_stall_counter() {
        let r = FlowTestBuilder::standard()
            .evaluations(vec![
                Ok(stalled("Coder")),
                Ok(stalled("Coder")),
                Ok(keep_going("Coder")),
                Ok(stalled("Coder")),
                Ok(stalled("Coder")),
                Ok(done()),
            ])
            .params(OrchestratorParams::default().with_max_stalls(3))
            .execute("task")
            .await;

        let output = r.output();
        assert_eq!(output.replans, 0);
        assert_eq!(output.turns, 5);
        assert_eq!(*r.observer.stalls.lock().unwrap(), vec![1, 2, 1, 2]);
    }

    #[tokio::test]
    async fn test_looping_counts_as_stall() {
        let r = FlowTestBuilder::standard()
            .evaluations(vec![
                Ok(progress(false, true, true, "Coder", "again")),
                Ok(progress(false, true, true, "Coder", "again")),
                Ok(done()),
            ])
            .params(OrchestratorParams::default().with_max_stalls(2))
            .execute("task")
            .await;

        assert_eq!(r.output().replans, 1);
        assert_eq!(r.output().turns, 1);
    }

    #[tokio::test]
    async fn test_turn_budget_exhaustion_is_incomplete() {
        let r = FlowTestBuilder::standard()
            .evaluation_fallback(Ok(keep_going("Coder")))
            .params(OrchestratorParams::default().with_max_turns(5))
            .execute("never finishes")
            .await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Incomplete);
        assert_eq!(output.stop_reason, StopReason::MaxTurnsReached);
        assert_eq!(output.turns, 5);
        assert_eq!(r.coder.calls(), 5);
        // best partial answer, no synthesis
        assert_eq!(output.answer.as_deref(), Some("ok"));
        assert_eq!(r.synthesizer.calls(), 0);
        assert!(!kinds(output).contains(&MessageKind::FinalAnswer));
    }

    #[tokio::test]
    async fn test_unknown_next_speaker_is_configuration_error() {
        let r = FlowTestBuilder::standard()
            .evaluations(vec![Ok(keep_going("Ghost"))])
            .execute("task")
            .await;

        match r.result {
            Err(RunError::Configuration(ConfigurationError::UnknownAgent { name, available })) => {
                assert_eq!(name, "Ghost");
                assert_eq!(available, "FileSurfer, Coder, Executor");
            }
            other => panic!("expected UnknownAgent, got {:?}", other.map(|o| o.status)),
        }
        assert_eq!(r.file_surfer.calls() + r.coder.calls() + r.executor.calls(), 0);
    }

    #[tokio::test]
    async fn test_injected_fault_only_on_scheduled_attempt() {
        let mut flow = FlowTestBuilder::standard()
            .evaluation_fallback(Ok(keep_going("Executor")))
            .params(OrchestratorParams::default().with_max_turns(3).with_max_stalls(5));
        flow.constraints =
            Some(ConstraintConfig::parse(None, Some("timeout"), Some(2), Some(1)).unwrap());
        let r = flow.execute("run the script").await;

        let output = r.output();
        assert_eq!(output.turns, 3);
        // the harness short-circuits the scheduled attempt
        assert_eq!(r.executor.calls(), 2);

        let executor_messages: Vec<MessageKind> = output
            .history
            .iter()
            .filter(|m| m.sender == "Executor")
            .map(|m| m.kind)
            .collect();
        assert_eq!(
            executor_messages,
            vec![
                MessageKind::AgentReply,
                MessageKind::InjectedFault,
                MessageKind::AgentReply,
            ]
        );

        let injected: Vec<(u32, bool)> = output
            .execution_records
            .iter()
            .map(|rec| (rec.attempt, rec.injected))
            .collect();
        assert_eq!(injected, vec![(1, false), (2, true), (3, false)]);
        assert!(
            output
                .execution_records
                .iter()
                .all(|rec| rec.error_type == Some(FaultClass::Timeout) && rec.trial_num == Some(1))
        );
        let injected_diags = output
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::InjectedFault)
            .count();
        assert_eq!(injected_diags, 1);
    }

    #[tokio::test]
    async fn test_agent_failures_count_as_stalls_and_never_abort() {
        let mut flow = FlowTestBuilder::standard()
            .evaluations(vec![
                Ok(keep_going("Coder")),
                Ok(keep_going("Coder")),
                Ok(keep_going("Coder")),
                Ok(done()),
            ])
            .params(OrchestratorParams::default().with_max_stalls(2));
        flow.coder = ScriptedAgent::new(
            AgentKind::CodeAuthor,
            vec![
                Err(AgentTurnError::Fault("model overloaded".into())),
                Err(AgentTurnError::Fault("model overloaded".into())),
            ],
        );
        let r = flow.execute("task").await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Complete);
        assert_eq!(output.turns, 2);
        assert_eq!(output.replans, 1);
        assert_eq!(
            kinds(output)
                .iter()
                .filter(|k| **k == MessageKind::AgentFailure)
                .count(),
            2
        );
        assert_eq!(
            output
                .diagnostics
                .iter()
                .filter(|d| d.code == DiagnosticCode::AgentTurnFailed)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_termination_phrase_stops_run() {
        let mut flow = FlowTestBuilder::standard()
            .evaluation_fallback(Ok(keep_going("Coder")));
        flow.coder = ScriptedAgent::new(
            AgentKind::CodeAuthor,
            vec![Ok(AgentReply::text("All three files listed. TERMINATE"))],
        );
        let r = flow.execute("task").await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Complete);
        assert!(matches!(output.stop_reason, StopReason::TerminationCondition(_)));
        assert_eq!(output.turns, 1);
        assert_eq!(r.evaluator.calls(), 1);
        assert_eq!(r.synthesizer.calls(), 1);
    }

    #[tokio::test]
    async fn test_custom_termination_phrase() {
        let mut flow = FlowTestBuilder::standard()
            .evaluation_fallback(Ok(keep_going("Coder")))
            .params(
                OrchestratorParams::default()
                    .with_termination_phrase("ALL DONE")
                    .with_max_turns(3),
            );
        flow.coder = ScriptedAgent::new(
            AgentKind::CodeAuthor,
            vec![Ok(AgentReply::text("TERMINATE")), Ok(AgentReply::text("ALL DONE"))],
        );
        let r = flow.execute("task").await;
        assert_eq!(r.output().turns, 2);
        assert_eq!(r.output().status, RunStatus::Complete);
    }

    #[tokio::test]
    async fn test_cancellation_mid_turn_skips_synthesis() {
        let token = CancellationToken::new();
        let mut flow = FlowTestBuilder::standard().evaluation_fallback(Ok(keep_going("Coder")));
        flow.coder.hang_and_cancel = Some(token.clone());
        flow.token = Some(token);
        let r = flow.execute("task").await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Cancelled);
        assert_eq!(output.stop_reason, StopReason::Cancelled);
        assert!(output.answer.is_none());
        assert_eq!(r.synthesizer.calls(), 0);
        assert_eq!(output.turns, 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let mut flow = FlowTestBuilder::standard();
        flow.token = Some(token);
        let r = flow.execute("task").await;

        assert_eq!(r.output().status, RunStatus::Cancelled);
        assert_eq!(r.output().turns, 0);
        assert!(r.output().task_ledger.is_none());
    }

    #[tokio::test]
    async fn test_turn_timeout_is_a_tolerated_failure() {
        let token = CancellationToken::new();
        let mut flow = FlowTestBuilder::standard()
            .evaluations(vec![Ok(keep_going("Coder")), Ok(done())])
            .params(
                OrchestratorParams::default()
                    .with_turn_timeout(Some(std::time::Duration::from_millis(20))),
            );
        // hangs without the coordinator's token, so only the timeout fires
        flow.coder.hang_and_cancel = Some(token);
        let r = flow.execute("task").await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Complete);
        let failure = output
            .history
            .iter()
            .find(|m| m.kind == MessageKind::AgentFailure)
            .expect("timeout recorded");
        assert!(failure.content.contains("timed out"));
    }

    #[tokio::test]
    async fn test_ledger_failures_are_retried() {
        let r = FlowTestBuilder::standard()
            .evaluations(vec![Err(ledger_failure()), Err(ledger_failure()), Ok(done())])
            .execute("task")
            .await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Complete);
        assert_eq!(r.evaluator.calls(), 3);
        let retries = output
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::LedgerRetry)
            .count();
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn test_exhausted_ledger_retries_end_incomplete() {
        let r = FlowTestBuilder::standard()
            .evaluation_fallback(Err(ledger_failure()))
            .params(OrchestratorParams::default().with_max_ledger_retries(1))
            .execute("task")
            .await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Incomplete);
        assert_eq!(output.stop_reason, StopReason::LedgerUnavailable);
        assert_eq!(r.evaluator.calls(), 2);
        assert_eq!(output.turns, 0);
    }

    #[tokio::test]
    async fn test_planning_failure_is_incomplete() {
        let mut flow = FlowTestBuilder::standard()
            .params(OrchestratorParams::default().with_max_ledger_retries(0));
        flow.builder = ScriptedBuilder::new(vec![Err(LedgerError::Parse(
            taskforce_domain::LedgerParseError::NoJson,
        ))]);
        let r = flow.execute("task").await;

        let output = r.output();
        assert_eq!(output.stop_reason, StopReason::PlanningFailed);
        assert_eq!(output.status, RunStatus::Incomplete);
        assert!(output.answer.is_none());
        assert_eq!(r.evaluator.calls(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_falls_back_to_last_reply() {
        let mut flow = FlowTestBuilder::standard().evaluations(vec![
            Ok(keep_going("FileSurfer")),
            Ok(done()),
        ]);
        flow.file_surfer = ScriptedAgent::new(
            AgentKind::FileInspector,
            vec![Ok(AgentReply::text("done: 3 files"))],
        );
        flow.synthesizer = ScriptedSynthesizer::new(Err(ledger_failure()));
        let r = flow.execute("task").await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Complete);
        assert_eq!(output.answer.as_deref(), Some("done: 3 files"));
        assert!(
            output
                .diagnostics
                .iter()
                .any(|d| d.code == DiagnosticCode::SynthesisFallback)
        );
    }

    #[tokio::test]
    async fn test_invalid_budgets_and_empty_task() {
        let r = FlowTestBuilder::standard()
            .params(OrchestratorParams::default().with_max_turns(0))
            .execute("task")
            .await;
        assert_eq!(
            r.result.err(),
            Some(RunError::Configuration(ConfigurationError::ZeroBudget("max_turns")))
        );

        let r = FlowTestBuilder::standard().execute("   ").await;
        assert_eq!(
            r.result.err(),
            Some(RunError::Configuration(ConfigurationError::EmptyTask))
        );
    }

    #[tokio::test]
    async fn test_observer_sees_state_transitions() {
        let r = FlowTestBuilder::standard()
            .evaluations(vec![Ok(keep_going("Coder")), Ok(done())])
            .execute("task")
            .await;

        assert_eq!(
            *r.observer.states.lock().unwrap(),
            vec![
                CoordinatorState::Planning,
                CoordinatorState::Evaluating,
                CoordinatorState::Dispatching,
                CoordinatorState::Evaluating,
                CoordinatorState::Terminated,
            ]
        );
    }

    #[tokio::test]
    async fn test_run_stream_ends_with_terminated() {
        let roster = Roster::from_agents(standard_agents(), false).unwrap();
        let coordinator = Coordinator::with_components(
            roster,
            Arc::new(ScriptedBuilder::new(vec![])),
            Arc::new(ScriptedEvaluator::new(vec![
                Ok(keep_going("FileSurfer")),
                Ok(done()),
            ])),
            Arc::new(ScriptedSynthesizer::new(Ok("answer".into()))),
        );

        let events: Vec<RunEvent> = coordinator.run_stream("task").collect().await;

        let last = events.last().expect("at least one event");
        match last {
            RunEvent::Terminated(Ok(output)) => assert_eq!(output.status, RunStatus::Complete),
            other => panic!("unexpected last event: {:?}", other),
        }
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        let messages = events
            .iter()
            .filter(|e| matches!(e, RunEvent::Message(_)))
            .count();
        assert_eq!(messages, 5);
        assert!(events.iter().any(|e| matches!(e, RunEvent::TaskLedger(_))));
    }

    #[tokio::test]
    async fn test_roster_diagnostics_are_returned() {
        let roster = Roster::from_agents(standard_agents(), false)
            .unwrap()
            .with_diagnostics(vec![Diagnostic::warning(
                DiagnosticCode::NonPreferredClient,
                "llama3 via ollama",
            )]);
        let coordinator = Coordinator::with_components(
            roster,
            Arc::new(ScriptedBuilder::new(vec![])),
            Arc::new(ScriptedEvaluator::new(vec![Ok(done())])),
            Arc::new(ScriptedSynthesizer::new(Ok("answer".into()))),
        );

        let output = coordinator.run("task").await.unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code, DiagnosticCode::NonPreferredClient);
        assert_eq!(output.turns, 0);
    }

    #[tokio::test]
    async fn test_evaluation_after_replan_sees_only_new_plan() {
        let gateway = Arc::new(RecordingGateway::new(vec![
            progress_json(false, false, "Coder"),
            progress_json(false, false, "Coder"),
            progress_json(false, false, "Coder"),
            progress_json(true, true, "Coder"),
        ]));
        let roster = Roster::from_agents(standard_agents(), false).unwrap();
        let coordinator = Coordinator::with_components(
            roster,
            Arc::new(ScriptedBuilder::new(vec![
                Ok(plan(&["OLD-PLAN-STEP"])),
                Ok(plan(&["NEW-PLAN-STEP"])),
            ])),
            Arc::new(LlmProgressLedgerEvaluator::new(gateway.clone())),
            Arc::new(ScriptedSynthesizer::new(Ok("answer".into()))),
        )
        .with_params(OrchestratorParams::default().with_max_stalls(3));

        let output = coordinator.run("summarize the report").await.unwrap();
        assert_eq!(output.replans, 1);
        assert_eq!(output.status, RunStatus::Complete);

        let prompts = gateway.prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("OLD-PLAN-STEP"));
        let last = &prompts[3];
        assert!(last.contains("NEW-PLAN-STEP"));
        assert!(last.contains("(plan v2)"));
        assert!(!last.contains("OLD-PLAN-STEP"));
        assert_eq!(output.progress_ledgers[3].plan_version, 2);
    }

    #[tokio::test]
    async fn test_no_termination_ignores_phrase() {
        let mut flow = FlowTestBuilder::standard()
            .evaluation_fallback(Ok(keep_going("Coder")))
            .params(OrchestratorParams::default().with_max_turns(2));
        flow.coder = ScriptedAgent::new(
            AgentKind::CodeAuthor,
            vec![Ok(AgentReply::text("TERMINATE")), Ok(AgentReply::text("TERMINATE"))],
        );
        flow.termination = Some(Arc::new(NoTermination));
        let r = flow.execute("task").await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Incomplete);
        assert_eq!(output.stop_reason, StopReason::MaxTurnsReached);
        assert_eq!(output.turns, 2);
        assert_eq!(r.synthesizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_during_synthesis() {
        let token = CancellationToken::new();
        let mut flow = FlowTestBuilder::standard().evaluations(vec![
            Ok(keep_going("FileSurfer")),
            Ok(done()),
        ]);
        flow.synthesizer.hang_and_cancel = Some(token.clone());
        flow.token = Some(token);
        let r = flow.execute("task").await;

        let output = r.output();
        assert_eq!(output.status, RunStatus::Cancelled);
        assert_eq!(output.stop_reason, StopReason::Cancelled);
        assert!(output.answer.is_none());
        assert_eq!(r.synthesizer.calls(), 1);
        assert!(!kinds(output).contains(&MessageKind::FinalAnswer));
        assert_eq!(
            r.observer.terminated.lock().unwrap().clone(),
            vec![RunStatus::Cancelled]
        );
    }
}
