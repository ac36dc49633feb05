//! Local code runner configuration from TOML (`[executor]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw executor configuration from TOML
///
/// ```toml
/// [executor]
/// work_dir = "./coding"
/// timeout_seconds = 60
/// python = "python3"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutorConfig {
    /// Working directory for executed code; a fresh temp dir when absent
    pub work_dir: Option<PathBuf>,
    /// Per-block timeout
    pub timeout_seconds: u64,
    pub python: String,
    pub shell: String,
    pub max_output_bytes: usize,
}

impl Default for FileExecutorConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            timeout_seconds: 60,
            python: "python3".to_string(),
            shell: "sh".to_string(),
            max_output_bytes: 1024 * 1024,
        }
    }
}
