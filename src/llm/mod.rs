//! Chat completion client and wire types.

mod aiproxy;

pub use aiproxy::AiProxyClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Completion request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected completion response: {0}")]
    Decode(String),

    #[error("Completion response contained no message content")]
    EmptyResponse,
}

/// Message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Structured-output constraint (`{"type": "json_schema", ...}`)
    pub response_format: Value,
}

/// The subset of the completion envelope we read.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice.
    pub fn into_content(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// A chat completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one completion request and return the first choice's content.
    async fn chat_completion(&self, request: &ChatCompletionRequest) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_choice_content_is_extracted() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "{\"code\": \"\"}"}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        }))
        .unwrap();
        assert_eq!(resp.into_content().unwrap(), "{\"code\": \"\"}");
    }

    #[test]
    fn missing_choices_is_empty_response() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(resp.into_content(), Err(LlmError::EmptyResponse)));

        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(matches!(resp.into_content(), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::new(Role::System, "hi");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "system", "content": "hi"})
        );
    }
}
