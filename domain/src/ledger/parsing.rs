//! Ledger parsing from model responses.
//!
//! Accepts JSON inside a fenced block (` ```json ` or bare ` ``` `), a
//! response that is entirely JSON, or the span between the first `{` and
//! the last `}`. Progress ledger fields may be `{"answer": .., "reason": ..}`
//! objects or bare values.

use super::progress_ledger::{LedgerAnswer, ProgressLedger};
use super::task_ledger::TaskLedgerDraft;
use serde_json::Value;
use thiserror::Error;

/// Why a ledger response could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerParseError {
    #[error("no JSON object found in response")]
    NoJson,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("plan has no steps")]
    EmptyPlan,
}

pub const PROGRESS_FIELDS: [&str; 5] = [
    "is_request_satisfied",
    "is_progress_being_made",
    "is_in_loop",
    "next_speaker",
    "instruction_or_question",
];

/// Find the first JSON object in a model response.
pub fn extract_json_object(response: &str) -> Option<Value> {
    // 1. fenced blocks
    let mut in_block = false;
    let mut current = String::new();
    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            current.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&current) {
                return Some(value);
            }
        } else if in_block {
            current.push_str(line);
            current.push('\n');
        }
    }

    // 2. whole response
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(response.trim()) {
        return Some(value);
    }

    // 3. outermost braces
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&response[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Parse `{facts, guesses, plan}` from a ledger builder response.
///
/// Each field may be an array of strings or a single multi-line string.
/// `plan` is required and must not be empty; `facts` and `guesses` default
/// to empty.
pub fn parse_task_ledger(response: &str) -> Result<TaskLedgerDraft, LedgerParseError> {
    let json = extract_json_object(response).ok_or(LedgerParseError::NoJson)?;

    let plan = match json.get("plan") {
        Some(v) => string_list("plan", v)?,
        None => return Err(LedgerParseError::MissingField("plan")),
    };
    if plan.is_empty() {
        return Err(LedgerParseError::EmptyPlan);
    }
    let facts = match json.get("facts") {
        Some(v) => string_list("facts", v)?,
        None => Vec::new(),
    };
    let guesses = match json.get("guesses").or_else(|| json.get("educated_guesses")) {
        Some(v) => string_list("guesses", v)?,
        None => Vec::new(),
    };

    Ok(TaskLedgerDraft {
        facts,
        guesses,
        plan,
    })
}

/// Parse the five-field progress ledger; every field must be present.
pub fn parse_progress_ledger(
    response: &str,
    plan_version: u32,
) -> Result<ProgressLedger, LedgerParseError> {
    let json = extract_json_object(response).ok_or(LedgerParseError::NoJson)?;

    Ok(ProgressLedger {
        is_request_satisfied: bool_field(&json, "is_request_satisfied")?,
        is_progress_being_made: bool_field(&json, "is_progress_being_made")?,
        is_in_loop: bool_field(&json, "is_in_loop")?,
        next_speaker: string_field(&json, "next_speaker")?,
        instruction_or_question: string_field(&json, "instruction_or_question")?,
        plan_version,
    })
}

/// Split a field into `(answer, reason)`, accepting bare values.
fn answer_and_reason<'a>(
    json: &'a Value,
    field: &'static str,
) -> Result<(&'a Value, String), LedgerParseError> {
    let value = json
        .get(field)
        .ok_or(LedgerParseError::MissingField(field))?;
    if let Value::Object(map) = value {
        let answer = map
            .get("answer")
            .ok_or_else(|| LedgerParseError::InvalidField {
                field,
                reason: "object has no \"answer\"".to_string(),
            })?;
        let reason = map
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok((answer, reason))
    } else {
        Ok((value, String::new()))
    }
}

fn bool_field(json: &Value, field: &'static str) -> Result<LedgerAnswer<bool>, LedgerParseError> {
    let (answer, reason) = answer_and_reason(json, field)?;
    let parsed = match answer {
        Value::Bool(b) => *b,
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => true,
            "false" | "no" => false,
            other => {
                return Err(LedgerParseError::InvalidField {
                    field,
                    reason: format!("expected a boolean, got \"{}\"", other),
                });
            }
        },
        other => {
            return Err(LedgerParseError::InvalidField {
                field,
                reason: format!("expected a boolean, got {}", other),
            });
        }
    };
    Ok(LedgerAnswer::new(parsed, reason))
}

fn string_field(
    json: &Value,
    field: &'static str,
) -> Result<LedgerAnswer<String>, LedgerParseError> {
    let (answer, reason) = answer_and_reason(json, field)?;
    match answer {
        Value::String(s) => Ok(LedgerAnswer::new(s.clone(), reason)),
        Value::Null => Err(LedgerParseError::InvalidField {
            field,
            reason: "answer is null".to_string(),
        }),
        other => Ok(LedgerAnswer::new(other.to_string(), reason)),
    }
}

fn string_list(field: &'static str, value: &Value) -> Result<Vec<String>, LedgerParseError> {
    match value {
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect()),
        Value::String(s) => Ok(s
            .lines()
            .map(strip_bullet)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(LedgerParseError::InvalidField {
            field,
            reason: format!("expected a list of strings, got {}", other),
        }),
    }
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line)
        .trim()
}
