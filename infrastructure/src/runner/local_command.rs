//! Local code runner: executes fenced code blocks as child processes.
//!
//! Each block is written to a script file in the working directory and run
//! with the configured interpreter. Blocks run in order and execution stops
//! at the first non-zero exit code.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use taskforce_application::ports::code_runner::{
    CodeExecutionOutput, CodeRunnerError, CodeRunnerPort,
};
use taskforce_domain::CodeBlock;
use taskforce_domain::core::string::truncate;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default timeout for one block (60 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Maximum captured output size (1 MB)
const DEFAULT_MAX_OUTPUT: usize = 1024 * 1024;

pub struct LocalCommandRunner {
    work_dir: PathBuf,
    timeout: Duration,
    shell: String,
    python: String,
    max_output_bytes: usize,
    scripts: AtomicU64,
}

impl LocalCommandRunner {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            shell: "sh".to_string(),
            python: "python3".to_string(),
            max_output_bytes: DEFAULT_MAX_OUTPUT,
            scripts: AtomicU64::new(0),
        }
    }

    /// Runner working in `$TMPDIR/taskforce-<pid>`
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join(format!("taskforce-{}", std::process::id())))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_max_output_bytes(mut self, max: usize) -> Self {
        self.max_output_bytes = max;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn interpreter(&self, block: &CodeBlock) -> Result<(&str, &'static str), CodeRunnerError> {
        match block.normalized_language() {
            "sh" => Ok((self.shell.as_str(), "sh")),
            "python" => Ok((self.python.as_str(), "py")),
            other => Err(CodeRunnerError::UnsupportedLanguage(other.to_string())),
        }
    }

    async fn write_script(&self, block: &CodeBlock, extension: &str) -> Result<PathBuf, CodeRunnerError> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| CodeRunnerError::Io(format!("{}: {}", self.work_dir.display(), e)))?;
        let n = self.scripts.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.work_dir.join(format!("block_{}.{}", n, extension));
        tokio::fs::write(&path, &block.code)
            .await
            .map_err(|e| CodeRunnerError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }

    async fn run_block(
        &self,
        block: &CodeBlock,
        cancellation: &CancellationToken,
    ) -> Result<(i32, String), CodeRunnerError> {
        let (program, extension) = self.interpreter(block)?;
        let script = self.write_script(block, extension).await?;

        let mut cmd = Command::new(program);
        cmd.arg(&script)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| CodeRunnerError::SpawnFailed(format!("{}: {}", program, e)))?;

        debug!(program, script = %script.display(), "Running code block");

        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(CodeRunnerError::Cancelled),
            result = tokio::time::timeout(self.timeout, child.wait_with_output()) => match result {
                Ok(output) => output.map_err(|e| CodeRunnerError::Io(e.to_string()))?,
                Err(_) => return Err(CodeRunnerError::Timeout(self.timeout)),
            },
        };

        let exit_code = output.status.code().unwrap_or(-1);
        Ok((exit_code, combine_output(&output.stdout, &output.stderr)))
    }
}

/// Combine stdout and stderr with a separator line.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    let mut combined = String::new();
    if !stdout.is_empty() {
        combined.push_str(&stdout);
    }
    if !stderr.is_empty() {
        if !combined.is_empty() {
            combined.push_str("\n--- stderr ---\n");
        }
        combined.push_str(&stderr);
    }
    combined
}

#[async_trait]
impl CodeRunnerPort for LocalCommandRunner {
    async fn run(
        &self,
        blocks: &[CodeBlock],
        cancellation: &CancellationToken,
    ) -> Result<CodeExecutionOutput, CodeRunnerError> {
        let mut output = String::new();
        let mut exit_code = 0;

        for block in blocks {
            let (code, text) = self.run_block(block, cancellation).await?;
            output.push_str(&text);
            exit_code = code;
            if code != 0 {
                break;
            }
        }

        if output.len() > self.max_output_bytes {
            output = truncate(&output, self.max_output_bytes);
            output.push_str("\n... (output truncated)");
        }

        info!(blocks = blocks.len(), exit_code, "Code execution finished");
        Ok(CodeExecutionOutput { exit_code, output })
    }
}
