//! Output format value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a finished run is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Final answer only (default)
    #[default]
    Answer,
    /// Answer plus ledgers, transcript and diagnostics
    Full,
    /// The whole run output as JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "answer" | "text" => Ok(Self::Answer),
            "full" => Ok(Self::Full),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_answer() {
        assert_eq!(OutputFormat::default(), OutputFormat::Answer);
    }

    #[test]
    fn test_deserialize_lowercase() {
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Answer));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
