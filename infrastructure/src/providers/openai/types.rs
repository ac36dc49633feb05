//! Wire types for the OpenAI-compatible chat completions API

use serde::{Deserialize, Serialize};
use taskforce_application::ports::llm_gateway::GatewayError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Extract the assistant text of the first choice.
pub fn response_text(body: &str) -> Result<String, GatewayError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed completion: {}", e)))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::InvalidResponse("completion has no choices".to_string()))?;
    choice
        .message
        .content
        .ok_or_else(|| GatewayError::InvalidResponse("completion has no content".to_string()))
}

/// Map an HTTP error status and body to a gateway error.
pub fn status_error(status: u16, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect());
    match status {
        401 | 403 => GatewayError::ConnectionError(format!("HTTP {}: {}", status, detail)),
        _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status, detail)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_first_choice() {
        let body = r#"{"id": "x", "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}
        ]}"#;
        assert_eq!(response_text(body).unwrap(), "hello");
    }

    #[test]
    fn test_response_without_choices_is_invalid() {
        let err = response_text(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
        assert!(matches!(
            response_text("not json").unwrap_err(),
            GatewayError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_status_error_uses_api_message() {
        let err = status_error(429, r#"{"error": {"message": "Rate limit reached"}}"#);
        assert_eq!(err.to_string(), "Request failed: HTTP 429: Rate limit reached");
        assert!(matches!(
            status_error(401, "nope"),
            GatewayError::ConnectionError(_)
        ));
    }

    #[test]
    fn test_request_skips_unset_options() {
        let messages = vec![ChatMessage::new(Role::User, "hi")];
        let request = ChatRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: None,
            max_tokens: Some(256),
            response_format: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 256);
        assert!(value.get("temperature").is_none());
        assert!(value.get("response_format").is_none());
    }
}
