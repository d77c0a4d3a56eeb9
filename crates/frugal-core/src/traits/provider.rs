// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for chat-completion backends.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::FrugalError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderKind, ProviderRequest, ProviderResponse, ProviderStreamChunk};

/// Normalized stream of chunks produced by [`ProviderAdapter::stream`].
pub type ProviderStream = Pin<Box<dyn Stream<Item = Result<ProviderStreamChunk, FrugalError>> + Send>>;

/// Adapter for a chat-completion backend.
///
/// Each implementation owns one wire protocol and normalizes it into
/// [`ProviderResponse`] (buffered) or [`ProviderStreamChunk`]s (streaming).
/// A missing credential must surface as [`FrugalError::MissingCredential`]
/// before any network call, and a non-success status as
/// [`FrugalError::Upstream`].
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// The backend this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, FrugalError>;

    /// Sends a completion request and returns a stream of response chunks.
    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, FrugalError>;
}
