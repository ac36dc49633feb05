//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ```toml
/// [logging]
/// conversation_log = "~/.local/share/taskforce/last-run.jsonl"
/// log_file = "~/.local/share/taskforce/taskforce.log"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of every run event
    pub conversation_log: Option<PathBuf>,
    /// Tracing output file (in addition to stderr)
    pub log_file: Option<PathBuf>,
}
