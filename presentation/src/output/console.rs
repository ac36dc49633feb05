//! Console output formatter for coordinator runs

use colored::Colorize;
use taskforce_application::RunOutput;
use taskforce_domain::{Message, MessageKind, OutputFormat, RunStatus, Severity};

/// Formats finished runs for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a run in the requested output format
    pub fn format(output: &RunOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Answer => Self::format_answer(output),
            OutputFormat::Full => Self::format_full(output),
            OutputFormat::Json => Self::format_json(output),
        }
    }

    /// Answer only, or a status line when the run has none to give
    pub fn format_answer(output: &RunOutput) -> String {
        match (&output.answer, output.status) {
            (Some(answer), RunStatus::Complete) => format!("{}\n", answer),
            (Some(answer), _) => format!(
                "{}\n\n{}\n",
                Self::status_line(output),
                Self::indent(answer, "  ")
            ),
            (None, _) => format!("{}\n", Self::status_line(output)),
        }
    }

    /// Header, ledger, transcript, diagnostics and answer
    pub fn format_full(output: &RunOutput) -> String {
        let mut out = String::new();

        out.push_str(&Self::header("Taskforce Run"));
        out.push('\n');

        if let Some(task) = output.history.iter().find(|m| m.kind == MessageKind::Task) {
            out.push_str(&format!("{} {}\n", "Task:".cyan().bold(), task.content));
        }
        out.push_str(&format!("{}\n", Self::status_line(output)));
        out.push_str(&format!(
            "{} {} turns, {} replans\n",
            "Budget:".cyan().bold(),
            output.turns,
            output.replans
        ));

        if let Some(ledger) = &output.task_ledger {
            out.push_str(&Self::section_header(&format!("Plan (v{})", ledger.version())));
            for (i, step) in ledger.plan().iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, step));
            }
            if !ledger.facts().is_empty() {
                out.push_str(&format!("\n{}\n", "Facts:".cyan().bold()));
                for fact in ledger.facts() {
                    out.push_str(&format!("  * {}\n", fact));
                }
            }
        }

        out.push_str(&Self::section_header("Transcript"));
        for message in output.history.iter().filter(|m| Self::in_transcript(m)) {
            out.push_str(&Self::transcript_entry(message));
        }

        if !output.diagnostics.is_empty() {
            out.push_str(&Self::section_header("Diagnostics"));
            for diagnostic in &output.diagnostics {
                let line = diagnostic.to_string();
                let line = match diagnostic.severity {
                    Severity::Error => line.red(),
                    Severity::Warning => line.yellow(),
                };
                out.push_str(&format!("  {}\n", line));
            }
        }

        if !output.execution_records.is_empty() {
            out.push_str(&Self::section_header("Execution Records"));
            for record in &output.execution_records {
                let marker = if record.injected { "injected" } else { "organic" };
                out.push_str(&format!(
                    "  #{} [{}] exit={} {}\n",
                    record.attempt,
                    marker,
                    record
                        .exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    record.outcome
                ));
            }
        }

        out.push_str(&Self::section_header("Answer"));
        match &output.answer {
            Some(answer) => out.push_str(&format!("\n{}\n", answer)),
            None => out.push_str(&format!("\n{}\n", "(no answer)".dimmed())),
        }

        out.push_str(&Self::footer());
        out
    }

    /// Format as JSON
    pub fn format_json(output: &RunOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    fn status_line(output: &RunOutput) -> String {
        let status = match output.status {
            RunStatus::Complete => output.status.to_string().green().bold(),
            RunStatus::Incomplete => output.status.to_string().yellow().bold(),
            RunStatus::Cancelled => output.status.to_string().red().bold(),
        };
        format!(
            "{} {} ({})",
            "Status:".cyan().bold(),
            status,
            output.stop_reason
        )
    }

    // Ledgers and the final answer have their own sections
    fn in_transcript(message: &Message) -> bool {
        !matches!(message.kind, MessageKind::Ledger | MessageKind::FinalAnswer)
    }

    fn transcript_entry(message: &Message) -> String {
        let title = format!("── #{} {} ({}) ──", message.sequence, message.sender, message.kind);
        let title = match message.kind {
            MessageKind::AgentFailure | MessageKind::InjectedFault => title.red().bold(),
            MessageKind::Instruction => title.blue().bold(),
            _ => title.yellow().bold(),
        };
        format!("\n{}\n{}\n", title, message.content)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
