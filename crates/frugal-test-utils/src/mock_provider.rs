// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with queued outcomes, so a
//! test can script a low-quality answer followed by a judge verdict followed
//! by an upstream failure, and then inspect every request that was sent.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use frugal_core::traits::{PluginAdapter, ProviderAdapter, ProviderStream};
use frugal_core::types::{
    HealthStatus, ProviderKind, ProviderRequest, ProviderResponse, ProviderStreamChunk,
    StreamEventType, TokenUsage,
};
use frugal_core::FrugalError;

/// What the mock does on its next call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Succeeds with this text.
    Reply(String),
    /// Fails with a non-success upstream status.
    Upstream { status: u16, body: String },
    /// Fails before reaching the backend, as with a missing key.
    MissingCredential,
    /// Streams one fragment, then reports an error mid-stream.
    StreamError { partial: String, message: String },
    /// Sleeps before replying; used to exercise timeouts.
    Delayed { delay: Duration, text: String },
}

/// A provider adapter that replays queued outcomes.
///
/// When the queue is empty every call succeeds with `"mock response"`.
#[derive(Clone)]
pub struct MockProvider {
    kind: ProviderKind,
    name: String,
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: Arc<Mutex<Vec<ProviderRequest>>>,
    usage: TokenUsage,
    stream_usage: bool,
}

impl MockProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            name: format!("mock-{kind}"),
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
            stream_usage: true,
        }
    }

    /// Queues successful replies in order.
    pub fn with_replies<I, S>(kind: ProviderKind, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new(kind);
        let queue = replies
            .into_iter()
            .map(|r| MockOutcome::Reply(r.into()))
            .collect();
        Self {
            outcomes: Arc::new(Mutex::new(queue)),
            ..provider
        }
    }

    /// Usage reported by every successful call.
    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.usage = TokenUsage {
            input_tokens,
            output_tokens,
        };
        self
    }

    /// Streams without a usage chunk, as some backends do.
    pub fn without_stream_usage(mut self) -> Self {
        self.stream_usage = false;
        self
    }

    pub async fn push(&self, outcome: MockOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    pub async fn push_reply(&self, text: impl Into<String>) {
        self.push(MockOutcome::Reply(text.into())).await;
    }

    /// Every request received so far, oldest first.
    pub async fn calls(&self) -> Vec<ProviderRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn next_outcome(&self, request: &ProviderRequest) -> MockOutcome {
        self.calls.lock().await.push(request.clone());
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Reply("mock response".to_string()))
    }

    fn upstream(&self, status: u16, body: String) -> FrugalError {
        FrugalError::Upstream {
            provider: self.kind,
            status,
            body,
        }
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, FrugalError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, FrugalError> {
        let text = match self.next_outcome(&request).await {
            MockOutcome::Reply(text) => text,
            MockOutcome::Delayed { delay, text } => {
                tokio::time::sleep(delay).await;
                text
            }
            MockOutcome::Upstream { status, body } => return Err(self.upstream(status, body)),
            MockOutcome::MissingCredential => {
                return Err(FrugalError::MissingCredential {
                    provider: self.kind,
                });
            }
            MockOutcome::StreamError { message, .. } => {
                return Err(FrugalError::provider(message));
            }
        };
        Ok(ProviderResponse {
            content: text,
            model: request.model,
            usage: self.usage,
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, FrugalError> {
        let mut chunks: Vec<Result<ProviderStreamChunk, FrugalError>> = vec![Ok(
            ProviderStreamChunk {
                event_type: StreamEventType::MessageStart,
                text: None,
                usage: None,
                error: None,
            },
        )];

        match self.next_outcome(&request).await {
            MockOutcome::Reply(text) | MockOutcome::Delayed { text, .. } => {
                // Word-sized fragments, keeping the separating whitespace.
                chunks.extend(
                    text.split_inclusive(' ')
                        .map(|fragment| Ok(ProviderStreamChunk::text(fragment))),
                );
                if self.stream_usage {
                    chunks.push(Ok(ProviderStreamChunk::usage(
                        StreamEventType::MessageDelta,
                        self.usage,
                    )));
                }
                chunks.push(Ok(ProviderStreamChunk::stop()));
            }
            MockOutcome::StreamError { partial, message } => {
                chunks.push(Ok(ProviderStreamChunk::text(partial)));
                chunks.push(Err(FrugalError::provider(message)));
            }
            MockOutcome::Upstream { status, body } => return Err(self.upstream(status, body)),
            MockOutcome::MissingCredential => {
                return Err(FrugalError::MissingCredential {
                    provider: self.kind,
                });
            }
        }

        Ok(Box::pin(stream::iter(chunks)))
    }
}
