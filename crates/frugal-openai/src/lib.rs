// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider adapter.
//!
//! OpenAI, DeepSeek, and Qwen (DashScope compatible mode) all speak the Chat
//! Completions protocol with Bearer authentication. One [`CompatProvider`]
//! per backend differs only in base URL and credential.

pub mod client;
pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use frugal_config::FrugalConfig;
use frugal_core::error::FrugalError;
use frugal_core::traits::{PluginAdapter, ProviderAdapter, ProviderStream};
use frugal_core::types::{
    HealthStatus, ProviderKind, ProviderRequest, ProviderResponse, ProviderStreamChunk,
    StreamEventType, TokenUsage,
};
use futures::stream::{self, StreamExt};
use tracing::info;

use crate::client::CompatClient;
use crate::sse::WireEvent;
use crate::types::{ChatChunk, ChatRequest, WireMessage, WireUsage};

/// Chat Completions provider for one OpenAI-compatible backend.
#[derive(Debug)]
pub struct CompatProvider {
    client: CompatClient,
}

impl CompatProvider {
    /// Builds the adapter for `kind` from configuration.
    ///
    /// # Errors
    /// Returns [`FrugalError::Config`] for [`ProviderKind::Anthropic`], which
    /// uses its own protocol.
    pub fn from_config(kind: ProviderKind, config: &FrugalConfig) -> Result<Self, FrugalError> {
        if kind == ProviderKind::Anthropic {
            return Err(FrugalError::Config(
                "anthropic is not an OpenAI-compatible backend".into(),
            ));
        }
        let client = CompatClient::new(
            kind,
            config.providers.resolve_api_key(kind),
            &config.providers.base_url(kind),
            Duration::from_secs(config.upstream.timeout_secs),
        )?;
        info!(provider = %kind, credential = client.has_credential(), "provider initialized");
        Ok(Self { client })
    }

    pub fn with_client(client: CompatClient) -> Self {
        Self { client }
    }
}

fn to_chat_request(request: &ProviderRequest) -> ChatRequest {
    ChatRequest {
        model: request.model.clone(),
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        stream: request.stream,
        stream_options: None,
    }
}

fn to_usage(u: WireUsage) -> TokenUsage {
    TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    }
}

#[async_trait]
impl PluginAdapter for CompatProvider {
    fn name(&self) -> &str {
        match self.client.kind() {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Qwen => "qwen",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, FrugalError> {
        if self.client.has_credential() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("API key not configured".into()))
        }
    }
}

#[async_trait]
impl ProviderAdapter for CompatProvider {
    fn kind(&self) -> ProviderKind {
        self.client.kind()
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, FrugalError> {
        let response = self.client.complete(&to_chat_request(&request)).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                FrugalError::provider(format!("{} response contained no choices", self.kind()))
            })?;

        Ok(ProviderResponse {
            content,
            model: response.model,
            usage: response.usage.map(to_usage).unwrap_or_default(),
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, FrugalError> {
        let events = self.client.stream(&to_chat_request(&request)).await?;

        let chunks = events.flat_map(|result| {
            let mapped: Vec<Result<ProviderStreamChunk, FrugalError>> = match result {
                Ok(WireEvent::Chunk(chunk)) => map_chunk(chunk).into_iter().map(Ok).collect(),
                Ok(WireEvent::Done) => vec![Ok(ProviderStreamChunk::stop())],
                Err(e) => vec![Err(e)],
            };
            stream::iter(mapped)
        });

        Ok(Box::pin(chunks))
    }
}

/// One wire chunk can carry a text fragment, a usage record, or both.
fn map_chunk(chunk: ChatChunk) -> Vec<ProviderStreamChunk> {
    let mut out = Vec::new();
    if let Some(text) = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|t| !t.is_empty())
    {
        out.push(ProviderStreamChunk::text(text));
    }
    if let Some(usage) = chunk.usage {
        out.push(ProviderStreamChunk::usage(
            StreamEventType::MessageDelta,
            to_usage(usage),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use frugal_core::ChatMessage;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(kind: ProviderKind, base_url: &str) -> CompatProvider {
        CompatProvider::with_client(
            CompatClient::new(kind, Some("sk-test".into()), base_url, Duration::from_secs(5))
                .unwrap(),
        )
    }

    fn request(stream: bool) -> ProviderRequest {
        ProviderRequest {
            model: "deepseek-coder".into(),
            messages: vec![
                ChatMessage::system("You write Rust."),
                ChatMessage::user("Reverse a string"),
            ],
            max_tokens: 1000,
            temperature: 0.7,
            stream,
        }
    }

    #[test]
    fn anthropic_is_rejected() {
        let err = CompatProvider::from_config(ProviderKind::Anthropic, &FrugalConfig::default())
            .unwrap_err();
        assert!(matches!(err, FrugalError::Config(_)));
    }

    #[test]
    fn names_follow_kind() {
        assert_eq!(provider(ProviderKind::Qwen, "http://x").name(), "qwen");
        assert_eq!(provider(ProviderKind::DeepSeek, "http://x").name(), "deepseek");
    }

    #[tokio::test]
    async fn complete_keeps_system_inline_and_reads_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {"role": "system", "content": "You write Rust."},
                    {"role": "user", "content": "Reverse a string"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "deepseek-coder",
                "choices": [{"message": {"role": "assistant", "content": "s.chars().rev().collect()"}}],
                "usage": {"prompt_tokens": 20, "completion_tokens": 8}
            })))
            .mount(&server)
            .await;

        let response = provider(ProviderKind::DeepSeek, &server.uri())
            .complete(request(false))
            .await
            .unwrap();
        assert_eq!(response.content, "s.chars().rev().collect()");
        assert_eq!(
            response.usage,
            TokenUsage {
                input_tokens: 20,
                output_tokens: 8
            }
        );
    }

    #[tokio::test]
    async fn empty_choices_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "deepseek-coder",
                "choices": []
            })))
            .mount(&server)
            .await;

        let err = provider(ProviderKind::DeepSeek, &server.uri())
            .complete(request(false))
            .await
            .unwrap_err();
        assert!(matches!(err, FrugalError::Provider { .. }));
    }

    #[tokio::test]
    async fn stream_emits_text_usage_then_stop() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data: {\"model\":\"deepseek-coder\",\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"fn \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"main\"},\"finish_reason\":\"stop\"}]}\n\n",
            "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":11,\"completion_tokens\":2}}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let chunks: Vec<ProviderStreamChunk> = provider(ProviderKind::DeepSeek, &server.uri())
            .stream(request(true))
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].text.as_deref(), Some("fn "));
        assert_eq!(chunks[1].text.as_deref(), Some("main"));
        assert_eq!(
            chunks[2].usage,
            Some(TokenUsage {
                input_tokens: 11,
                output_tokens: 2
            })
        );
        assert_eq!(chunks[3].event_type, StreamEventType::MessageStop);
    }
}
