// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared-secret authentication via the `x-api-key` header.
//!
//! The accepted key is the configured `auth.api_key`. In development mode
//! with no key configured, the documented development key is accepted
//! instead. In production with no key configured, every request is
//! rejected (fail-closed).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use frugal_config::{FrugalConfig, ServerMode};
use frugal_core::FrugalError;

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The key protected routes accept, if any.
#[derive(Clone)]
pub struct AuthConfig {
    expected_key: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "expected_key",
                &self.expected_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

impl AuthConfig {
    pub fn new(expected_key: Option<String>) -> Self {
        Self {
            expected_key: expected_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn from_config(config: &FrugalConfig) -> Self {
        let key = match (&config.auth.api_key, config.server.mode) {
            (Some(key), _) => Some(key.clone()),
            (None, ServerMode::Development) => {
                tracing::warn!("no auth.api_key configured, accepting the development key");
                Some(config.auth.dev_api_key.clone())
            }
            (None, ServerMode::Production) => {
                tracing::error!("no auth.api_key configured in production, rejecting all requests");
                None
            }
        };
        Self::new(key)
    }

    pub fn accepts(&self, presented: Option<&str>) -> bool {
        match (&self.expected_key, presented) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }
}

/// Middleware that rejects requests without the expected `x-api-key`.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if auth.accepts(presented) {
        next.run(request).await
    } else {
        tracing::debug!(present = presented.is_some(), "api key rejected");
        ApiError(FrugalError::Auth).into_response()
    }
}
