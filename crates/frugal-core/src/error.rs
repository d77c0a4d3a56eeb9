// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Frugal completion router.

use std::time::Duration;

use thiserror::Error;

use crate::types::ProviderKind;

/// The primary error type used across provider adapters and the routing pipeline.
#[derive(Debug, Error)]
pub enum FrugalError {
    /// Malformed request body. Never retried.
    #[error("{0}")]
    Validation(String),

    /// Missing or wrong shared secret.
    #[error("Invalid API key")]
    Auth,

    /// Configuration errors (invalid TOML, bad values, unusable headers).
    #[error("configuration error: {0}")]
    Config(String),

    /// A backend credential is absent. Raised before any network call.
    #[error("{provider} API key not configured")]
    MissingCredential { provider: ProviderKind },

    /// A backend answered with a non-success HTTP status.
    #[error("{provider} API error ({status}): {body}")]
    Upstream {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    /// Transport or decoding failure talking to a backend.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// The per-client request window is exhausted.
    #[error("rate limit exceeded, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// Quality judge call or verdict parsing failed.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FrugalError {
    /// Shorthand for a transport-level provider failure without a source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }
}
