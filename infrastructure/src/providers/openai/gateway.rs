//! OpenAI-compatible LLM gateway
//!
//! Works with any server exposing `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style proxies, Ollama, vLLM, ...).

use super::session::OpenAiSession;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use taskforce_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use taskforce_domain::ModelInfo;
use tracing::info;

/// Shared HTTP client and request settings for all sessions
pub struct OpenAiClient {
    pub(super) http: reqwest::Client,
    pub(super) base_url: String,
    pub(super) api_key: Option<String>,
    pub(super) model: ModelInfo,
    pub(super) temperature: Option<f32>,
    pub(super) max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub(super) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Builder-style settings for [`OpenAiGateway`]
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(120),
            temperature: None,
            max_tokens: None,
        }
    }
}

pub struct OpenAiGateway {
    client: Arc<OpenAiClient>,
}

impl OpenAiGateway {
    pub fn new(model: ModelInfo, settings: OpenAiSettings) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("taskforce/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::ConnectionError(format!("HTTP client: {}", e)))?;

        info!(model = %model, base_url = %settings.base_url, "OpenAI-compatible gateway ready");
        Ok(Self {
            client: Arc::new(OpenAiClient {
                http,
                base_url: settings.base_url,
                api_key: settings.api_key,
                model,
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
            }),
        })
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    fn model_info(&self) -> &ModelInfo {
        &self.client.model
    }

    async fn create_session(&self) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession::new(self.client.clone(), None)))
    }

    async fn create_session_with_system_prompt(
        &self,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession::new(
            self.client.clone(),
            Some(system_prompt),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_trims_slash() {
        let gateway = OpenAiGateway::new(
            ModelInfo::new("llama3", "ollama"),
            OpenAiSettings {
                base_url: "http://localhost:11434/v1/".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            gateway.client.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(gateway.model_info().provider, "ollama");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let gateway = OpenAiGateway::new(
            ModelInfo::new("gpt-4o", "openai"),
            OpenAiSettings {
                // port 9 (discard) is closed on test machines
                base_url: "http://127.0.0.1:9/v1".to_string(),
                timeout: Duration::from_secs(5),
                ..Default::default()
            },
        )
        .unwrap();
        let session = gateway.create_session().await.unwrap();
        let err = session.send("hello").await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::ConnectionError(_) | GatewayError::RequestFailed(_) | GatewayError::Timeout
        ));
    }
}
