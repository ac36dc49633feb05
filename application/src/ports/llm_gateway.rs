//! LLM Gateway port
//!
//! Defines the interface for communicating with the reasoning client. The
//! coordinator uses it for ledgers and final answers; LLM-backed agents use
//! it for their own sessions.

use async_trait::async_trait;
use taskforce_domain::ModelInfo;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Model identity and advertised capabilities
    fn model_info(&self) -> &ModelInfo;

    /// Create a new session
    async fn create_session(&self) -> Result<Box<dyn LlmSession>, GatewayError>;

    /// Create a new session with a system prompt
    async fn create_session_with_system_prompt(
        &self,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// An active LLM session
///
/// Sessions keep their own message history: each `send` sees every earlier
/// exchange of the same session.
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Send a message and get a response
    async fn send(&self, content: &str) -> Result<String, GatewayError>;

    /// Send a message and ask for a JSON response matching `schema`.
    ///
    /// Default implementation ignores the schema and calls `send()`; callers
    /// still parse the text, so providers without structured output work
    /// unchanged.
    async fn send_structured(
        &self,
        content: &str,
        _schema: &serde_json::Value,
    ) -> Result<String, GatewayError> {
        self.send(content).await
    }
}
