// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible Chat Completions endpoints.

use std::time::Duration;

use frugal_core::{FrugalError, ProviderKind};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::sse::{self, WireStream};
use crate::types::{ChatRequest, ChatResponse, ErrorEnvelope, StreamOptions};

/// Client bound to one backend's base URL and credential.
#[derive(Clone)]
pub struct CompatClient {
    client: reqwest::Client,
    kind: ProviderKind,
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl std::fmt::Debug for CompatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatClient")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CompatClient {
    /// `base_url` is the API root; `/chat/completions` is appended.
    pub fn new(
        kind: ProviderKind,
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FrugalError> {
        let mut headers = HeaderMap::new();
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
            kind,
            api_key: api_key.filter(|k| !k.is_empty()),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn authorized_post(&self) -> Result<reqwest::RequestBuilder, FrugalError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(FrugalError::MissingCredential { provider: self.kind })?;
        Ok(self.client.post(&self.endpoint).bearer_auth(key))
    }

    /// Sends a buffered request.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, FrugalError> {
        let mut req = request.clone();
        req.stream = false;
        req.stream_options = None;

        let response = self
            .authorized_post()?
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        debug!(provider = %self.kind, status = %status, model = %req.model, "completion response received");
        if !status.is_success() {
            return Err(self.upstream_error(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        serde_json::from_str(&body).map_err(|e| FrugalError::Provider {
            message: format!("failed to parse {} response: {e}", self.kind),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a streaming request. The deadline covers the response head only.
    pub async fn stream(&self, request: &ChatRequest) -> Result<WireStream, FrugalError> {
        let mut req = request.clone();
        req.stream = true;
        req.stream_options = Some(StreamOptions {
            include_usage: true,
        });

        let send = self.authorized_post()?.json(&req).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| FrugalError::Timeout {
                duration: self.timeout,
            })?
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        debug!(provider = %self.kind, status = %status, model = %req.model, "streaming response received");
        if !status.is_success() {
            return Err(self.upstream_error(response).await);
        }

        Ok(sse::parse_sse_stream(response))
    }

    async fn upstream_error(&self, response: reqwest::Response) -> FrugalError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(env) => warn!(provider = %self.kind, status, "API error: {}", env.error.message),
            Err(_) => warn!(provider = %self.kind, status, "API returned non-success status"),
        }
        FrugalError::Upstream {
            provider: self.kind,
            status,
            body,
        }
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
