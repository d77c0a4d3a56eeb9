// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for the Frugal router.
//!
//! Exposes the completion pipeline over REST with shared-secret auth,
//! per-client rate limiting, and SSE streaming, plus the public model
//! catalogue, status, health, and metrics endpoints.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod server;
pub mod sse;

pub use auth::{API_KEY_HEADER, AuthConfig};
pub use error::{ApiError, ErrorResponse};
pub use rate_limit::RateLimiter;
pub use server::{GatewayState, MetricsRender, StatusInfo, build_router, start_server};
