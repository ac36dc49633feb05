//! Fenced code block extraction for the code executor.

use serde::{Deserialize, Serialize};

/// A fenced code block taken from a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag after the opening fence (`python`, `sh`, ...); empty when absent
    pub language: String,
    pub code: String,
}

impl CodeBlock {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
        }
    }

    /// Normalized language, with shell aliases folded into `sh`.
    pub fn normalized_language(&self) -> &str {
        match self.language.trim().to_ascii_lowercase().as_str() {
            "bash" | "shell" | "sh" | "console" | "zsh" => "sh",
            "python" | "py" | "python3" => "python",
            _ if self.language.trim().is_empty() => "sh",
            _ => self.language.trim(),
        }
    }
}

/// Extract every fenced code block from `text`, in order.
///
/// An unterminated trailing fence is ignored.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        match current.take() {
            None => {
                if let Some(tag) = trimmed.strip_prefix("```") {
                    current = Some((tag.trim().to_string(), String::new()));
                }
            }
            Some((language, mut code)) => {
                if trimmed.trim_end() == "```" {
                    blocks.push(CodeBlock::new(language, code));
                } else {
                    code.push_str(line);
                    code.push('\n');
                    current = Some((language, code));
                }
            }
        }
    }

    blocks
}
