//! HTTP transport for the chat-completions endpoint.
//!
//! One `send` is exactly one remote call with one key. The transport only
//! classifies the result; rotation is the dispatcher's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::llm_client::dispatcher::RequestOutcome;
use crate::llm_client::{ApiErrorEnvelope, ChatRequest, ChatResponse, LlmError};

/// A single request/response call against the completion service.
///
/// Swappable so the client can be exercised without a network.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(&self, api_key: &str, request: &ChatRequest) -> RequestOutcome<ChatResponse>;
}

/// `reqwest`-backed transport for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: completions_endpoint(api_base_url),
        })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(&self, api_key: &str, request: &ChatRequest) -> RequestOutcome<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return RequestOutcome::other(LlmError::Http(e)),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return classify_failure(status, &body);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return RequestOutcome::other(LlmError::Http(e)),
        };

        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(parsed) => {
                if let Some(usage) = &parsed.usage {
                    debug!(
                        "Completion usage: prompt_tokens={}, completion_tokens={}",
                        usage.prompt_tokens, usage.completion_tokens
                    );
                }
                RequestOutcome::Success(parsed)
            }
            Err(e) => RequestOutcome::other(LlmError::Parse(e)),
        }
    }
}

/// Maps a non-success HTTP status to a dispatcher outcome. Only 429 rotates.
pub fn classify_failure<T>(status: StatusCode, body: &str) -> RequestOutcome<T> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return RequestOutcome::rate_limited();
    }
    // Prefer the structured error message when the body carries one.
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    RequestOutcome::other(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

fn completions_endpoint(api_base_url: &str) -> String {
    format!("{}/chat/completions", api_base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::dispatcher::FailureKind;

    #[test]
    fn test_429_is_rate_limited() {
        let outcome: RequestOutcome<()> = classify_failure(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(
            outcome,
            RequestOutcome::Failure(FailureKind::RateLimited)
        ));
    }

    #[test]
    fn test_server_error_is_other_and_keeps_status() {
        let outcome: RequestOutcome<()> =
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, "upstream down");
        match outcome {
            RequestOutcome::Failure(FailureKind::Other(LlmError::Api { status, message })) => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected Api failure, got {other:?}"),
        }
    }

    #[test]
    fn test_structured_error_message_is_extracted() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let outcome: RequestOutcome<()> = classify_failure(StatusCode::UNAUTHORIZED, body);
        match outcome {
            RequestOutcome::Failure(FailureKind::Other(LlmError::Api { status, message })) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api failure, got {other:?}"),
        }
    }

    #[test]
    fn test_completions_endpoint_trims_trailing_slash() {
        assert_eq!(
            completions_endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            completions_endpoint("http://localhost:8080/v1"),
            "http://localhost:8080/v1/chat/completions"
        );
    }
}
