//! Run diagnostics.
//!
//! Non-fatal findings (capability mismatches, tolerated agent failures,
//! injected faults, ledger retries) are collected as [`Diagnostic`]s and
//! returned with the run output instead of being printed as global warnings.
//!
//! # Examples
//!
//! ```
//! use taskforce_domain::agent::validation::{Diagnostic, DiagnosticCode, Severity};
//!
//! let diags = vec![Diagnostic::warning(DiagnosticCode::NonPreferredClient, "llama3 via ollama")];
//! assert!(!Diagnostic::has_errors(&diags));
//! ```

use crate::core::model::ClientCapability;
use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fatal: the run cannot work at all.
    Error,
    /// Non-fatal: the run continues but may not behave as expected.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Identifies a specific diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "code", content = "detail")]
pub enum DiagnosticCode {
    /// The reasoning client does not advertise a capability the roster relies on.
    MissingClientCapability(ClientCapability),
    /// The reasoning client is not served by OpenAI or Azure OpenAI.
    NonPreferredClient,
    /// An agent turn failed; the run continued.
    AgentTurnFailed,
    /// The constraint harness injected a scheduled fault.
    InjectedFault,
    /// A ledger call failed and was retried.
    LedgerRetry,
    /// Final-answer synthesis failed; the last agent reply was used instead.
    SynthesisFallback,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::MissingClientCapability(_) => "missing_client_capability",
            DiagnosticCode::NonPreferredClient => "non_preferred_client",
            DiagnosticCode::AgentTurnFailed => "agent_turn_failed",
            DiagnosticCode::InjectedFault => "injected_fault",
            DiagnosticCode::LedgerRetry => "ledger_retry",
            DiagnosticCode::SynthesisFallback => "synthesis_fallback",
        }
    }
}

/// A non-fatal (or fatal) finding produced during roster assembly or a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
        diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code.as_str(), self.message)
    }
}
