//! Chat session over the stateless completions API.
//!
//! The API keeps no state, so the session holds the message history and
//! replays it on every call.

use super::gateway::OpenAiClient;
use super::types::{ChatMessage, ChatRequest, Role, response_text, status_error};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use taskforce_application::ports::llm_gateway::{GatewayError, LlmSession};
use tokio::sync::Mutex;
use tracing::debug;

pub struct OpenAiSession {
    client: Arc<OpenAiClient>,
    messages: Mutex<Vec<ChatMessage>>,
}

impl OpenAiSession {
    pub fn new(client: Arc<OpenAiClient>, system_prompt: Option<&str>) -> Self {
        let messages = system_prompt
            .filter(|p| !p.is_empty())
            .map(|p| vec![ChatMessage::new(Role::System, p)])
            .unwrap_or_default();
        Self {
            client,
            messages: Mutex::new(messages),
        }
    }

    /// Append a user message, call the API and record the reply.
    ///
    /// A failed call leaves the history unchanged.
    async fn exchange(
        &self,
        content: &str,
        response_format: Option<serde_json::Value>,
    ) -> Result<String, GatewayError> {
        let mut messages = self.messages.lock().await;
        messages.push(ChatMessage::new(Role::User, content));

        match self.complete(&messages, response_format).await {
            Ok(text) => {
                messages.push(ChatMessage::new(Role::Assistant, text.clone()));
                Ok(text)
            }
            Err(e) => {
                messages.pop();
                Err(e)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        response_format: Option<serde_json::Value>,
    ) -> Result<String, GatewayError> {
        let client = &self.client;
        let request = ChatRequest {
            model: &client.model.name,
            messages,
            temperature: client.temperature,
            max_tokens: client.max_tokens,
            response_format,
        };

        debug!(
            model = %client.model.name,
            messages = messages.len(),
            "Calling chat completions API"
        );

        let mut builder = client.http.post(client.completions_url()).json(&request);
        if let Some(key) = &client.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        response_text(&body)
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl LlmSession for OpenAiSession {
    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        self.exchange(content, None).await
    }

    async fn send_structured(
        &self,
        content: &str,
        schema: &serde_json::Value,
    ) -> Result<String, GatewayError> {
        if !self.client.model.capabilities.json_output {
            return self.send(content).await;
        }
        let prompt = format!(
            "{}\n\nRespond with a single JSON object matching this schema:\n{}",
            content, schema
        );
        self.exchange(&prompt, Some(json!({"type": "json_object"})))
            .await
    }
}
