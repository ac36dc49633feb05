//! Constraint configuration for controlled experiments.
//!
//! An operator parametrizes a run with an input modality, a fault class to
//! inject into code execution, and query/trial counters. All four are
//! optional and immutable for the run.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("unknown input type '{0}' (expected one of: text, image, audio, video, file)")]
    UnknownInputType(String),

    #[error(
        "unknown error type '{0}' (expected one of: timeout, runtime_error, syntax_error, permission_denied, missing_dependency)"
    )]
    UnknownErrorType(String),

    #[error("{field} must be >= 1, got {value}")]
    NonPositiveCounter { field: &'static str, value: i64 },
}

/// Input modality an experiment declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Image,
    Audio,
    Video,
    File,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Image => "image",
            InputType::Audio => "audio",
            InputType::Video => "video",
            InputType::File => "file",
        }
    }
}

impl FromStr for InputType {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(InputType::Text),
            "image" => Ok(InputType::Image),
            "audio" => Ok(InputType::Audio),
            "video" => Ok(InputType::Video),
            "file" => Ok(InputType::File),
            _ => Err(ConstraintError::UnknownInputType(s.to_string())),
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Class of fault the harness injects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultClass {
    Timeout,
    RuntimeError,
    SyntaxError,
    PermissionDenied,
    MissingDependency,
}

impl FaultClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultClass::Timeout => "timeout",
            FaultClass::RuntimeError => "runtime_error",
            FaultClass::SyntaxError => "syntax_error",
            FaultClass::PermissionDenied => "permission_denied",
            FaultClass::MissingDependency => "missing_dependency",
        }
    }

    /// Output the executor reports for an injected fault of this class.
    pub fn simulated_output(&self) -> &'static str {
        match self {
            FaultClass::Timeout => "Timeout: code execution exceeded the time limit",
            FaultClass::RuntimeError => {
                "Traceback (most recent call last):\nRuntimeError: execution failed"
            }
            FaultClass::SyntaxError => "SyntaxError: invalid syntax",
            FaultClass::PermissionDenied => "PermissionError: [Errno 13] Permission denied",
            FaultClass::MissingDependency => {
                "ModuleNotFoundError: No module named 'required_module'"
            }
        }
    }

    /// Exit code the executor reports for an injected fault of this class.
    pub fn simulated_exit_code(&self) -> i32 {
        match self {
            FaultClass::Timeout => 124,
            FaultClass::PermissionDenied => 126,
            FaultClass::MissingDependency => 127,
            FaultClass::RuntimeError | FaultClass::SyntaxError => 1,
        }
    }
}

impl FromStr for FaultClass {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "timeout" => Ok(FaultClass::Timeout),
            "runtime_error" => Ok(FaultClass::RuntimeError),
            "syntax_error" => Ok(FaultClass::SyntaxError),
            "permission_denied" => Ok(FaultClass::PermissionDenied),
            "missing_dependency" => Ok(FaultClass::MissingDependency),
            _ => Err(ConstraintError::UnknownErrorType(s.to_string())),
        }
    }
}

impl std::fmt::Display for FaultClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Experiment parameters applied to the code executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintConfig {
    pub input_type: Option<InputType>,
    pub error_type: Option<FaultClass>,
    pub query_num: Option<u32>,
    pub trial_num: Option<u32>,
}

impl ConstraintConfig {
    /// Parse raw operator parameters. Unknown names and counters below 1
    /// are configuration errors.
    pub fn parse(
        input_type: Option<&str>,
        error_type: Option<&str>,
        query_num: Option<i64>,
        trial_num: Option<i64>,
    ) -> Result<Self, ConstraintError> {
        Ok(Self {
            input_type: input_type.map(str::parse).transpose()?,
            error_type: error_type.map(str::parse).transpose()?,
            query_num: query_num.map(|v| counter("query_num", v)).transpose()?,
            trial_num: trial_num.map(|v| counter("trial_num", v)).transpose()?,
        })
    }

    /// Attempt on which the fault is injected (`query_num`, default 1).
    pub fn scheduled_attempt(&self) -> u32 {
        self.query_num.unwrap_or(1)
    }

    /// Fault to inject on `attempt`, if any.
    pub fn fault_for_attempt(&self, attempt: u32) -> Option<FaultClass> {
        self.error_type
            .filter(|_| attempt == self.scheduled_attempt())
    }

    pub fn is_active(&self) -> bool {
        self.error_type.is_some()
    }
}

fn counter(field: &'static str, value: i64) -> Result<u32, ConstraintError> {
    if value < 1 || value > i64::from(u32::MAX) {
        return Err(ConstraintError::NonPositiveCounter { field, value });
    }
    Ok(value as u32)
}
