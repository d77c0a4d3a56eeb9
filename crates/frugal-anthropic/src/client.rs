// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication, per-call deadlines, and status-to-error mapping.

use std::time::Duration;

use frugal_core::{FrugalError, ProviderKind};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::sse::{self, EventStream};
use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// HTTP client for Anthropic API communication.
///
/// The credential is checked on every call so a missing key fails the
/// request before anything touches the network.
#[derive(Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    ///
    /// # Arguments
    /// * `api_key` - credential, or `None` when unconfigured
    /// * `api_version` - value of the `anthropic-version` header (e.g. "2023-06-01")
    /// * `base_url` - API root; `/messages` is appended
    /// * `timeout` - deadline for buffered calls and for the first byte of a stream
    pub fn new(
        api_key: Option<String>,
        api_version: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FrugalError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(api_version).map_err(|e| {
                FrugalError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| FrugalError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()),
            endpoint: format!("{}/messages", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn authorized_post(&self) -> Result<reqwest::RequestBuilder, FrugalError> {
        let key = self.api_key.as_deref().ok_or(FrugalError::MissingCredential {
            provider: ProviderKind::Anthropic,
        })?;
        Ok(self.client.post(&self.endpoint).header("x-api-key", key))
    }

    /// Sends a non-streaming request and returns the full response.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, FrugalError> {
        let mut req = request.clone();
        req.stream = false;

        let response = self
            .authorized_post()?
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        debug!(status = %status, model = %req.model, "completion response received");
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        serde_json::from_str(&body).map_err(|e| FrugalError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a streaming request and returns a stream of SSE events.
    ///
    /// The deadline covers the response head only; the body may take as long
    /// as the backend keeps producing frames.
    pub async fn stream_message(&self, request: &MessageRequest) -> Result<EventStream, FrugalError> {
        let mut req = request.clone();
        req.stream = true;

        let send = self.authorized_post()?.json(&req).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| FrugalError::Timeout {
                duration: self.timeout,
            })?
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        debug!(status = %status, model = %req.model, "streaming response received");
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        Ok(sse::parse_sse_stream(response))
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> FrugalError {
    if e.is_timeout() {
        FrugalError::Timeout { duration: timeout }
    } else {
        FrugalError::Provider {
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

async fn upstream_error(response: reqwest::Response) -> FrugalError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
        warn!(status, error_type = %api_err.error.type_, "Anthropic API error: {}", api_err.error.message);
    } else {
        warn!(status, "Anthropic API returned non-success status");
    }
    FrugalError::Upstream {
        provider: ProviderKind::Anthropic,
        status,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> AnthropicClient {
        AnthropicClient::new(
            Some("test-api-key".into()),
            "2023-06-01",
            base_url,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn test_request() -> MessageRequest {
        MessageRequest {
            model: "claude-3-5-sonnet-20241022".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            system: None,
            max_tokens: 1000,
            temperature: 0.7,
            stream: false,
        }
    }

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "Hi there!"}],
            "model": "claude-3-5-sonnet-20241022",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[tokio::test]
    async fn complete_message_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .complete_message(&test_request())
            .await
            .unwrap();

        assert_eq!(result.id, "msg_test");
        assert_eq!(result.usage.input_tokens, 10);
        assert_eq!(result.usage.output_tokens, 5);
    }

    #[tokio::test]
    async fn client_sends_correct_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "max_tokens": 1000,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).complete_message(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn non_success_is_upstream_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete_message(&test_request())
            .await
            .unwrap_err();
        match err {
            FrugalError::Upstream {
                provider,
                status,
                body,
            } => {
                assert_eq!(provider, ProviderKind::Anthropic);
                assert_eq!(status, 529);
                assert!(body.contains("overloaded_error"), "got: {body}");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_credential_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            AnthropicClient::new(None, "2023-06-01", &server.uri(), Duration::from_secs(5))
                .unwrap();
        assert!(!client.has_credential());
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert!(matches!(
            err,
            FrugalError::MissingCredential {
                provider: ProviderKind::Anthropic
            }
        ));
        let err = client.stream_message(&test_request()).await.err();
        assert!(matches!(err, Some(FrugalError::MissingCredential { .. })));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = AnthropicClient::new(
            Some("k".into()),
            "2023-06-01",
            &server.uri(),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert!(matches!(err, FrugalError::Timeout { .. }), "got {err:?}");
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let client = AnthropicClient::new(
            Some(String::new()),
            "2023-06-01",
            "http://localhost",
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(!client.has_credential());
        assert!(!format!("{client:?}").contains("test-api-key"));
    }
}
