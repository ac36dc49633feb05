//! Progress reporting for coordinator runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use taskforce_application::RunObserver;
use taskforce_domain::{
    CoordinatorState, Diagnostic, ExecutionRecord, Message, MessageKind, ProgressLedger,
    RunStatus, Severity, StopReason, TaskLedger, core::string::preview,
};

const PREVIEW_LEN: usize = 120;

/// Reports run progress on stderr with a spinner
///
/// Messages are printed above the spinner so the transcript scrolls while
/// the current state stays visible. With `verbose`, ledgers and full
/// message bodies are shown as well.
pub struct ConsoleRunObserver {
    spinner: Mutex<Option<ProgressBar>>,
    verbose: bool,
}

impl ConsoleRunObserver {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let pb = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        f(pb);
    }

    // A hidden bar (stderr is not a terminal) swallows println
    fn println(&self, line: String) {
        self.with_spinner(|pb| {
            if pb.is_hidden() {
                eprintln!("{}", line);
            } else {
                pb.println(line);
            }
        });
    }

    /// Spinner label for a control-loop state
    pub fn state_label(state: CoordinatorState) -> &'static str {
        match state {
            CoordinatorState::Planning => "Planning",
            CoordinatorState::Evaluating => "Evaluating progress",
            CoordinatorState::Dispatching => "Waiting for agent",
            CoordinatorState::Replanning => "Replanning",
            CoordinatorState::Terminated => "Done",
        }
    }

    /// One display line for a conversation message, `None` when hidden
    pub fn message_line(message: &Message, verbose: bool) -> Option<String> {
        let body = if verbose {
            message.content.clone()
        } else {
            preview(&message.content, PREVIEW_LEN)
        };
        let sender = message.sender.as_str();
        let line = match message.kind {
            MessageKind::Task => format!("{} {}", "task".cyan().bold(), body),
            MessageKind::Ledger if !verbose => return None,
            MessageKind::Ledger => format!("{}\n{}", "ledger".cyan().bold(), body.dimmed()),
            MessageKind::Instruction => {
                format!("{} {}", format!("{} ->", sender).blue().bold(), body)
            }
            MessageKind::AgentReply => format!("{} {}", format!("{}:", sender).green().bold(), body),
            MessageKind::AgentFailure => {
                format!("{} {}", format!("{} x", sender).red().bold(), body)
            }
            MessageKind::InjectedFault => format!(
                "{} {}",
                format!("{} x (injected)", sender).magenta().bold(),
                body
            ),
            // Printed by the caller once the spinner is gone
            MessageKind::FinalAnswer => return None,
        };
        Some(line)
    }

    pub fn stall_line(count: u32, max_stalls: u32) -> String {
        format!("{} stall {}/{}", "!".yellow().bold(), count, max_stalls)
            .yellow()
            .to_string()
    }

    pub fn diagnostic_line(diagnostic: &Diagnostic) -> String {
        match diagnostic.severity {
            Severity::Error => format!("{} {}", "error:".red().bold(), diagnostic.message),
            Severity::Warning => format!("{} {}", "warning:".yellow().bold(), diagnostic.message),
        }
    }
}

impl Default for ConsoleRunObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RunObserver for ConsoleRunObserver {
    fn on_state_change(&self, state: CoordinatorState) {
        if state.is_terminal() {
            return;
        }
        self.with_spinner(|pb| pb.set_prefix(Self::state_label(state)));
    }

    fn on_task_ledger(&self, ledger: &TaskLedger) {
        self.println(format!(
            "{} plan v{} ({} steps)",
            "->".cyan(),
            ledger.version(),
            ledger.plan().len()
        ));
        if self.verbose {
            for (i, step) in ledger.plan().iter().enumerate() {
                self.println(format!("   {}. {}", i + 1, step));
            }
        }
    }

    fn on_progress_ledger(&self, ledger: &ProgressLedger) {
        self.with_spinner(|pb| pb.set_message(format!("next: {}", ledger.next_speaker())));
        if self.verbose {
            self.println(
                format!(
                    "   satisfied={} progress={} loop={} ({})",
                    ledger.is_complete(),
                    ledger.is_making_progress(),
                    ledger.is_looping(),
                    preview(&ledger.is_progress_being_made.reason, PREVIEW_LEN)
                )
                .dimmed()
                .to_string(),
            );
        }
    }

    fn on_message(&self, message: &Message) {
        if let Some(line) = Self::message_line(message, self.verbose) {
            self.println(line);
        }
    }

    fn on_stall(&self, count: u32, max_stalls: u32) {
        self.println(Self::stall_line(count, max_stalls));
    }

    fn on_replan(&self, plan_version: u32) {
        self.println(format!(
            "{} {}",
            "~>".yellow().bold(),
            format!("replanned (plan v{})", plan_version).yellow()
        ));
    }

    fn on_diagnostic(&self, diagnostic: &Diagnostic) {
        self.println(Self::diagnostic_line(diagnostic));
    }

    fn on_execution_record(&self, record: &ExecutionRecord) {
        if self.verbose {
            self.println(
                format!("   exec #{}: {}", record.attempt, record.outcome)
                    .dimmed()
                    .to_string(),
            );
        }
    }

    fn on_terminated(&self, status: RunStatus, reason: &StopReason, _answer: Option<&str>) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let summary = match status {
            RunStatus::Complete => format!("{} ({})", "complete".green(), reason),
            RunStatus::Incomplete => format!("{} ({})", "incomplete".yellow(), reason),
            RunStatus::Cancelled => "cancelled".red().to_string(),
        };
        if let Some(pb) = guard.take() {
            pb.set_prefix(Self::state_label(CoordinatorState::Terminated));
            pb.finish_with_message(summary);
        }
    }
}
