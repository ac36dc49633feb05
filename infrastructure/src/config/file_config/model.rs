//! Reasoning client configuration from TOML (`[model]` section)

use serde::{Deserialize, Serialize};
use taskforce_domain::{ModelCapabilities, ModelInfo};

/// Raw model configuration from TOML
///
/// # Example
///
/// ```toml
/// [model]
/// name = "gpt-4o"
/// provider = "openai"
/// base_url = "https://api.openai.com/v1"
/// api_key_env = "OPENAI_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub name: String,
    pub provider: String,
    /// Model family recorded in execution records (defaults to `name`)
    pub family: Option<String>,
    /// Base URL of an OpenAI-compatible chat completions API
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (not recommended; use the env var instead)
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Per-request timeout for the HTTP client
    pub timeout_seconds: u64,
    pub vision: bool,
    pub function_calling: bool,
    pub json_output: bool,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4o".to_string(),
            provider: "openai".to_string(),
            family: None,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            temperature: None,
            max_tokens: None,
            timeout_seconds: 120,
            vision: true,
            function_calling: true,
            json_output: true,
        }
    }
}

impl FileModelConfig {
    /// What the configured client advertises about itself.
    pub fn to_model_info(&self) -> ModelInfo {
        ModelInfo::new(self.name.trim(), self.provider.trim())
            .with_family(self.family.as_deref().unwrap_or(self.name.trim()))
            .with_capabilities(ModelCapabilities {
                vision: self.vision,
                function_calling: self.function_calling,
                json_output: self.json_output,
            })
    }

    /// API key from `api_key`, falling back to the `api_key_env` variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.is_empty())
    }
}
