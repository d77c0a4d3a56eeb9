// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use frugal_agent::CacheStats;
use frugal_core::{ChatMessage, FrugalError, HealthStatus, PluginAdapter, RequestSpec};
use frugal_cost::ModelProfile;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::server::GatewayState;
use crate::sse;

/// Builds a [`RequestSpec`] from a raw JSON body, applying defaults.
///
/// # Errors
/// [`FrugalError::Validation`] when `messages` is missing or not an array,
/// or any field has the wrong type.
pub fn parse_request(body: &Value) -> Result<RequestSpec, FrugalError> {
    let messages = body
        .get("messages")
        .filter(|m| m.is_array())
        .ok_or_else(|| FrugalError::Validation("Messages array is required".into()))?;
    let messages: Vec<ChatMessage> = serde_json::from_value(messages.clone())
        .map_err(|e| FrugalError::Validation(format!("Invalid messages: {e}")))?;

    let mut spec = RequestSpec::new(messages);

    if let Some(v) = present(body, "max_tokens") {
        spec.max_tokens = v
            .as_u64()
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                FrugalError::Validation("max_tokens must be a positive integer".into())
            })?;
    }
    if let Some(v) = present(body, "temperature") {
        spec.temperature = v
            .as_f64()
            .ok_or_else(|| FrugalError::Validation("temperature must be a number".into()))?;
    }
    if let Some(v) = present(body, "prefer_cost") {
        spec.prefer_cost = v
            .as_bool()
            .ok_or_else(|| FrugalError::Validation("prefer_cost must be a boolean".into()))?;
    }
    if let Some(v) = present(body, "stream") {
        spec.stream = v
            .as_bool()
            .ok_or_else(|| FrugalError::Validation("stream must be a boolean".into()))?;
    }

    Ok(spec)
}

/// A field that is present and not `null`.
fn present<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| !v.is_null())
}

/// POST /completions
///
/// Buffered requests return the full record as JSON; `stream: true`
/// switches to Server-Sent Events.
pub async fn post_completions(
    State(state): State<GatewayState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|e| FrugalError::Validation(e.body_text()))?;
    let spec = parse_request(&body)?;

    if spec.stream {
        let events = state.pipeline.stream(&spec).await?;
        return Ok(sse::into_sse(events).into_response());
    }

    let record = state.pipeline.complete(&spec).await?;
    Ok(Json(record).into_response())
}

#[derive(Debug, Serialize)]
pub struct PricingEntry {
    pub provider: String,
    pub api_model: &'static str,
    pub input_per_k: f64,
    pub output_per_k: f64,
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl From<&ModelProfile> for PricingEntry {
    fn from(p: &ModelProfile) -> Self {
        Self {
            provider: p.provider.to_string(),
            api_model: p.api_model,
            input_per_k: p.input_per_k,
            output_per_k: p.output_per_k,
            input_per_million: p.input_per_million(),
            output_per_million: p.output_per_million(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub pricing: BTreeMap<String, PricingEntry>,
}

/// GET /models
pub async fn get_models(State(state): State<GatewayState>) -> Json<ModelsResponse> {
    let registry = state.pipeline.registry();
    let models = registry.profiles().map(|p| p.id.to_string()).collect();
    let pricing = registry
        .profiles()
        .map(|p| (p.id.to_string(), PricingEntry::from(p)))
        .collect();
    Json(ModelsResponse { models, pricing })
}

/// GET /cache-stats
pub async fn get_cache_stats(State(state): State<GatewayState>) -> Json<CacheStats> {
    let stats = match state.pipeline.cache() {
        Some(cache) => cache.stats(),
        None => CacheStats {
            hits: 0,
            misses: 0,
            hit_rate: "0.00%".to_string(),
            entries: 0,
            ttl_secs: 0,
        },
    };
    Json(stats)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct FeatureFlags {
    pub caching: bool,
    pub rate_limiting: bool,
    pub quality_evaluation: bool,
    pub streaming: bool,
    pub escalation: bool,
}

#[derive(Debug, Serialize)]
pub struct CacheSummary {
    pub entries: usize,
    pub hit_rate: String,
    pub ttl_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct RateLimitSummary {
    pub max_requests: u32,
    pub window_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub mode: String,
    pub uptime_secs: u64,
    pub features: FeatureFlags,
    pub cache: Option<CacheSummary>,
    pub rate_limit: Option<RateLimitSummary>,
    pub providers: BTreeMap<String, HealthStatus>,
}

/// GET /status
pub async fn get_status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    let mut providers = BTreeMap::new();
    for (kind, adapter) in state.pipeline.providers().iter() {
        let health = adapter
            .health_check()
            .await
            .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
        providers.insert(kind.to_string(), health);
    }

    let cache = state.pipeline.cache().map(|cache| {
        let stats = cache.stats();
        CacheSummary {
            entries: stats.entries,
            hit_rate: stats.hit_rate,
            ttl_secs: stats.ttl_secs,
        }
    });

    let rate_limit = state.limiter.as_ref().map(|l| RateLimitSummary {
        max_requests: l.max_requests(),
        window_secs: l.window().as_secs(),
    });

    Json(StatusResponse {
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
        mode: state.status.mode.to_string(),
        uptime_secs: state.status.start_time.elapsed().as_secs(),
        features: FeatureFlags {
            caching: cache.is_some(),
            rate_limiting: rate_limit.is_some(),
            quality_evaluation: state.status.quality_evaluation,
            streaming: true,
            escalation: state.status.quality_evaluation && state.status.max_retries > 0,
        },
        cache,
        rate_limit,
        providers,
    })
}

/// GET /metrics
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.metrics {
        Some(render) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_when_fields_absent() {
        let spec = parse_request(&json!({"messages": [{"role": "user", "content": "hi"}]})).unwrap();
        assert_eq!(spec.max_tokens, 1000);
        assert_eq!(spec.temperature, 0.7);
        assert!(spec.prefer_cost);
        assert!(!spec.stream);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let spec = parse_request(&json!({
            "messages": [{"role": "system", "content": "be brief"}, {"role": "user", "content": "hi"}],
            "max_tokens": 250,
            "temperature": 0.2,
            "prefer_cost": false,
            "stream": true
        }))
        .unwrap();
        assert_eq!(spec.messages.len(), 2);
        assert_eq!(spec.max_tokens, 250);
        assert_eq!(spec.temperature, 0.2);
        assert!(!spec.prefer_cost);
        assert!(spec.stream);
    }

    #[test]
    fn missing_or_non_array_messages_rejected() {
        for body in [json!({}), json!({"messages": "hi"}), json!({"messages": null})] {
            let err = parse_request(&body).unwrap_err();
            assert_eq!(err.to_string(), "Messages array is required");
        }
    }

    #[test]
    fn bad_field_types_rejected() {
        let msgs = json!([{"role": "user", "content": "hi"}]);
        for (field, value) in [
            ("max_tokens", json!(0)),
            ("max_tokens", json!("many")),
            ("temperature", json!("warm")),
            ("prefer_cost", json!("yes")),
        ] {
            let mut body = json!({"messages": msgs.clone()});
            body[field] = value;
            assert!(
                matches!(parse_request(&body), Err(FrugalError::Validation(_))),
                "{field} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_role_rejected() {
        let err = parse_request(&json!({"messages": [{"role": "tool", "content": "x"}]}))
            .unwrap_err();
        assert!(matches!(err, FrugalError::Validation(_)));
    }
}
