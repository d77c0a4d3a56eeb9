// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic provider adapter.
//!
//! Implements [`ProviderAdapter`] for the Anthropic Messages API, with both
//! buffered completion and streaming SSE responses. System turns are moved
//! out of the message list into the top-level `system` field.

pub mod client;
pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use frugal_config::FrugalConfig;
use frugal_core::error::FrugalError;
use frugal_core::traits::{PluginAdapter, ProviderAdapter, ProviderStream};
use frugal_core::types::{
    HealthStatus, ProviderKind, ProviderRequest, ProviderResponse,
    ProviderStreamChunk, Role, StreamEventType, TokenUsage,
};
use futures::stream::StreamExt;
use tracing::info;

use crate::client::AnthropicClient;
use crate::sse::StreamEvent;
use crate::types::{ApiMessage, MessageRequest, ResponseContentBlock, SseDelta};

/// Anthropic provider implementing [`ProviderAdapter`].
///
/// API key resolution order: `providers.anthropic.api_key` -> `ANTHROPIC_API_KEY`.
/// A missing key is reported per request, not at startup.
#[derive(Debug)]
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from the given configuration.
    pub fn new(config: &FrugalConfig) -> Result<Self, FrugalError> {
        let api_key = config.providers.resolve_api_key(ProviderKind::Anthropic);
        let client = AnthropicClient::new(
            api_key,
            &config.providers.anthropic.api_version,
            &config.providers.base_url(ProviderKind::Anthropic),
            Duration::from_secs(config.upstream.timeout_secs),
        )?;

        info!(
            credential = client.has_credential(),
            "Anthropic provider initialized"
        );

        Ok(Self { client })
    }

    /// Creates a provider with an existing client.
    pub fn with_client(client: AnthropicClient) -> Self {
        Self { client }
    }
}

/// Converts a [`ProviderRequest`] to an Anthropic [`MessageRequest`].
///
/// The first system turn becomes the out-of-band `system` field. The Messages
/// API has no system role, so any later system turns are dropped.
fn to_message_request(request: &ProviderRequest) -> MessageRequest {
    let system = request
        .messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.clone());
    let turns = request.messages.iter().filter(|m| m.role != Role::System);

    MessageRequest {
        model: request.model.clone(),
        messages: turns
            .map(|m| ApiMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect(),
        system,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        stream: request.stream,
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
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
impl ProviderAdapter for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, FrugalError> {
        let api_request = to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;

        let content = response
            .content
            .iter()
            .filter_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(text.as_str()),
                ResponseContentBlock::Other => None,
            })
            .collect::<String>();

        Ok(ProviderResponse {
            content,
            model: response.model,
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, FrugalError> {
        let api_request = to_message_request(&request);
        let events = self.client.stream_message(&api_request).await?;

        let chunks = events.filter_map(|result| async move {
            match result {
                Ok(event) => map_stream_event(event).map(Ok),
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::pin(chunks))
    }
}

/// Maps an SSE [`StreamEvent`] to a normalized chunk. Pings produce nothing.
fn map_stream_event(event: StreamEvent) -> Option<ProviderStreamChunk> {
    match event {
        StreamEvent::MessageStart(ms) => Some(ProviderStreamChunk::usage(
            StreamEventType::MessageStart,
            TokenUsage {
                input_tokens: ms.message.usage.input_tokens,
                output_tokens: ms.message.usage.output_tokens,
            },
        )),
        StreamEvent::ContentBlockDelta(delta) => match delta.delta {
            SseDelta::TextDelta { text } => Some(ProviderStreamChunk::text(text)),
            SseDelta::Other => None,
        },
        StreamEvent::MessageDelta(md) => md.usage.map(|u| {
            ProviderStreamChunk::usage(
                StreamEventType::MessageDelta,
                TokenUsage {
                    input_tokens: u.input_tokens,
                    output_tokens: u.output_tokens,
                },
            )
        }),
        StreamEvent::MessageStop => Some(ProviderStreamChunk::stop()),
        StreamEvent::Error(err) => Some(ProviderStreamChunk::error(format!(
            "{}: {}",
            err.error.type_, err.error.message
        ))),
        StreamEvent::Ping => None,
    }
}
