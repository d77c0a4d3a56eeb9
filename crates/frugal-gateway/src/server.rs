// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use frugal_agent::CompletionPipeline;
use frugal_config::{FrugalConfig, ServerMode};
use frugal_core::FrugalError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;
use crate::rate_limit::{RateLimiter, rate_limit_middleware};

/// Renders the Prometheus exposition text.
pub type MetricsRender = Arc<dyn Fn() -> String + Send + Sync>;

/// Static facts reported by `GET /status`.
#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub start_time: Instant,
    pub mode: ServerMode,
    pub quality_evaluation: bool,
    pub max_retries: u32,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: CompletionPipeline,
    pub auth: AuthConfig,
    /// `None` when rate limiting is disabled.
    pub limiter: Option<Arc<RateLimiter>>,
    pub status: StatusInfo,
    pub metrics: Option<MetricsRender>,
}

impl GatewayState {
    pub fn from_config(config: &FrugalConfig, pipeline: CompletionPipeline) -> Self {
        let limiter = config.rate_limit.enabled.then(|| {
            Arc::new(RateLimiter::new(
                config.rate_limit.max_requests,
                std::time::Duration::from_secs(config.rate_limit.window_secs),
            ))
        });
        Self {
            pipeline,
            auth: AuthConfig::from_config(config),
            limiter,
            status: StatusInfo {
                start_time: Instant::now(),
                mode: config.server.mode,
                quality_evaluation: config.quality.enabled,
                max_retries: config.quality.max_retries,
            },
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, render: MetricsRender) -> Self {
        self.metrics = Some(render);
        self
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("pipeline", &self.pipeline)
            .field("auth", &self.auth)
            .field("limiter", &self.limiter)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Builds the application router.
///
/// - `POST /completions`, `POST /api/v1/chat/completions`: rate limited, then authenticated
/// - `GET /cache-stats`: authenticated
/// - `GET /models`, `GET /api/v1/models/available`, `GET /status`, `GET /health`, `GET /metrics`: public
pub fn build_router(state: GatewayState) -> Router {
    let mut completion_routes = Router::new()
        .route("/completions", post(handlers::post_completions))
        .route("/api/v1/chat/completions", post(handlers::post_completions))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));
    // Layers added last run first: the limiter sees requests before auth.
    if let Some(limiter) = state.limiter.clone() {
        completion_routes = completion_routes.route_layer(axum_middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    let private_routes = Router::new()
        .route("/cache-stats", get(handlers::get_cache_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/models", get(handlers::get_models))
        .route("/api/v1/models/available", get(handlers::get_models))
        .route("/status", get(handlers::get_status))
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics));

    Router::new()
        .merge(completion_routes)
        .merge(private_routes)
        .merge(public_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the gateway until `cancel` fires, then drains in-flight requests.
pub async fn start_server(
    host: &str,
    port: u16,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), FrugalError> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FrugalError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { cancel.cancelled().await })
    .await
    .map_err(|e| FrugalError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
