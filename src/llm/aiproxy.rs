//! OpenAI-compatible completion client (AI proxy by default).

use async_trait::async_trait;

use super::{ChatCompletionRequest, ChatCompletionResponse, LlmClient, LlmError};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct AiProxyClient {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl AiProxyClient {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl LlmClient for AiProxyClient {
    async fn chat_completion(&self, request: &ChatCompletionRequest) -> Result<String, LlmError> {
        tracing::debug!(url = %self.url, model = %request.model, "Sending completion request");

        // Generations can run for minutes; no request timeout.
        let response = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %self.url, error = %e, "Completion request failed (network error)");
                LlmError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Completion API returned an error");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let envelope: ChatCompletionResponse =
            serde_json::from_slice(&body).map_err(|e| LlmError::Decode(e.to_string()))?;

        envelope.into_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    use crate::agent::build_request;

    #[derive(Clone, Default)]
    struct Captured {
        auth: Arc<Mutex<Option<String>>>,
        body: Arc<Mutex<Option<Value>>>,
    }

    /// Serve `router` on an ephemeral local port and return its completions URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    fn recording_upstream(captured: Captured, reply: Value) -> Router {
        Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                let reply = reply.clone();
                async move {
                    *captured.auth.lock().unwrap() = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *captured.body.lock().unwrap() = Some(body);
                    Json(reply)
                }
            }),
        )
    }

    #[tokio::test]
    async fn sends_bearer_none_when_token_unset() {
        let captured = Captured::default();
        let url = spawn_upstream(recording_upstream(
            captured.clone(),
            json!({"choices": [{"message": {"role": "assistant", "content": "{\"code\": \"print(1)\"}"}}]}),
        ))
        .await;

        let config = crate::config::Config::new(std::path::PathBuf::from("."));
        let client = AiProxyClient::new(url, config.bearer_token());
        let content = client
            .chat_completion(&build_request("gpt-4o-mini", "say one"))
            .await
            .unwrap();

        assert_eq!(content, "{\"code\": \"print(1)\"}");
        assert_eq!(captured.auth.lock().unwrap().as_deref(), Some("Bearer None"));

        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "say one");
        assert_eq!(body["messages"][1]["role"], "system");
        assert_eq!(body["response_format"]["type"], "json_schema");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid token").into_response() }),
        );
        let url = spawn_upstream(router).await;

        let err = AiProxyClient::new(url, "None")
            .chat_completion(&build_request("m", "task"))
            .await
            .unwrap_err();
        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid token");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_envelope_is_decode_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { "definitely not json" }),
        );
        let url = spawn_upstream(router).await;

        let err = AiProxyClient::new(url, "token")
            .chat_completion(&build_request("m", "task"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_choices_is_empty_response() {
        let url = spawn_upstream(recording_upstream(Captured::default(), json!({"choices": []}))).await;

        let err = AiProxyClient::new(url, "token")
            .chat_completion(&build_request("m", "task"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse), "got {err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = AiProxyClient::new(format!("http://{}/v1/chat/completions", addr), "token")
            .chat_completion(&build_request("m", "task"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Network(_)), "got {err:?}");
    }
}
