// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Frugal completion router.
//!
//! This crate provides the error type, the shared request/response types,
//! the provider adapter traits, and token estimation used throughout the
//! workspace.

pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

pub use error::FrugalError;
pub use tokens::TokenEstimator;
pub use traits::{PluginAdapter, ProviderAdapter, ProviderStream};
pub use types::{
    ChatMessage, Evaluation, HealthStatus, ModelId, PASS_THRESHOLD, ProviderKind, ProviderRequest,
    ProviderResponse, ProviderStreamChunk, RequestSpec, Role, StreamEventType, TokenUsage,
    last_user_message,
};
