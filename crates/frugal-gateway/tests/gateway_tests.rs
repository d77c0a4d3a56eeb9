// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use frugal_agent::{CompletionPipeline, ProviderSet};
use frugal_config::FrugalConfig;
use frugal_core::{ProviderKind, TokenEstimator};
use frugal_gateway::{GatewayState, build_router};
use frugal_test_utils::{MockOutcome, MockProvider};
use serde_json::{Value, json};
use tower::ServiceExt;

const KEY: &str = "dev-key-123";

struct Harness {
    deepseek: MockProvider,
    router: Router,
}

impl Harness {
    fn new(config: FrugalConfig) -> Self {
        Self::with_metrics(config, None)
    }

    fn with_metrics(config: FrugalConfig, metrics: Option<&'static str>) -> Self {
        let deepseek = MockProvider::new(ProviderKind::DeepSeek);
        let providers = ProviderSet::new()
            .with(Arc::new(MockProvider::new(ProviderKind::OpenAi)))
            .with(Arc::new(MockProvider::new(ProviderKind::Anthropic)))
            .with(Arc::new(deepseek.clone()))
            .with(Arc::new(MockProvider::new(ProviderKind::Qwen)));
        let pipeline =
            CompletionPipeline::new(&config, providers, TokenEstimator::word_heuristic()).unwrap();
        let mut state = GatewayState::from_config(&config, pipeline);
        if let Some(text) = metrics {
            state = state.with_metrics(Arc::new(move || text.to_string()));
        }
        Self {
            deepseek,
            router: build_router(state),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }
}

fn quiet_config() -> FrugalConfig {
    let mut config = FrugalConfig::default();
    config.quality.enabled = false;
    config
}

fn from_peer(mut request: Request<Body>, peer: [u8; 4]) -> Request<Body> {
    let addr = SocketAddr::from((peer, 40000));
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

fn completion(body: Value, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/completions").header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    from_peer(builder.body(Body::from(body.to_string())).unwrap(), [127, 0, 0, 1])
}

fn get(path: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn math_question() -> Value {
    json!({"messages": [{"role": "user", "content": "Calculate 15% of 250"}]})
}

#[tokio::test]
async fn buffered_completion_returns_record() {
    let harness = Harness::new(quiet_config());
    harness.deepseek.push_reply("x = 2").await;

    let (status, headers, body) = harness.send(completion(math_question(), Some(KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["ratelimit-limit"], "100");
    assert_eq!(headers["ratelimit-remaining"], "99");

    let record: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(record["response"], "x = 2");
    assert_eq!(record["model_used"], "deepseek-chat");
    assert_eq!(record["intent_detected"], "math");
    assert_eq!(record["tokens_used"], 30);
    assert_eq!(record["retried"], false);
    assert!(record.get("cached").is_none());
    assert_eq!(record["routing_decision"]["final_model"], "deepseek-chat");
}

#[tokio::test]
async fn alias_route_serves_completions() {
    let harness = Harness::new(quiet_config());
    let request = from_peer(
        Request::post("/api/v1/chat/completions")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", KEY)
            .body(Body::from(math_question().to_string()))
            .unwrap(),
        [127, 0, 0, 1],
    );
    let (status, _, body) = harness.send(request).await;
    assert_eq!(status, StatusCode::OK);
    let record: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(record["response"], "mock response");
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let harness = Harness::new(quiet_config());
    harness.deepseek.push_reply("x = 2").await;

    harness.send(completion(math_question(), Some(KEY))).await;
    let (status, _, body) = harness.send(completion(math_question(), Some(KEY))).await;
    assert_eq!(status, StatusCode::OK);
    let record: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(record["cached"], true);
    assert_eq!(record["response"], "x = 2");
    assert_eq!(harness.deepseek.call_count().await, 1);

    let (_, _, stats) = harness.send(get("/cache-stats", Some(KEY))).await;
    let stats: Value = serde_json::from_str(&stats).unwrap();
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["hit_rate"], "50.00%");
    assert_eq!(stats["entries"], 1);
}

#[tokio::test]
async fn missing_messages_is_bad_request() {
    let harness = Harness::new(quiet_config());
    let (status, _, body) = harness
        .send(completion(json!({"prompt": "hi"}), Some(KEY)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "Messages array is required");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let harness = Harness::new(quiet_config());
    let request = from_peer(
        Request::post("/completions")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", KEY)
            .body(Body::from("{not json"))
            .unwrap(),
        [127, 0, 0, 1],
    );
    let (status, _, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_or_wrong_key_is_unauthorized() {
    let harness = Harness::new(quiet_config());
    for key in [None, Some("wrong")] {
        let (status, _, body) = harness.send(completion(math_question(), key)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"error":"Invalid API key"}"#);
    }
    assert_eq!(harness.deepseek.call_count().await, 0);
}

#[tokio::test]
async fn cache_stats_requires_key() {
    let harness = Harness::new(quiet_config());
    let (status, _, _) = harness.send(get("/cache-stats", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rate_limit_applies_before_auth() {
    let mut config = quiet_config();
    config.rate_limit.max_requests = 2;
    let harness = Harness::new(config);

    harness.send(completion(math_question(), Some(KEY))).await;
    harness.send(completion(math_question(), None)).await;
    let (status, headers, body) = harness.send(completion(math_question(), Some(KEY))).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(headers.contains_key(header::RETRY_AFTER));
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body["error"],
        "Too many requests from this IP, please try again after 15 minutes."
    );
}

#[tokio::test]
async fn rate_limit_disabled_never_rejects() {
    let mut config = quiet_config();
    config.rate_limit.enabled = false;
    config.rate_limit.max_requests = 1;
    let harness = Harness::new(config);
    for _ in 0..3 {
        let (status, headers, _) = harness.send(completion(math_question(), Some(KEY))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!headers.contains_key("ratelimit-limit"));
    }
}

#[tokio::test]
async fn upstream_failure_is_internal_error() {
    let harness = Harness::new(quiet_config());
    harness
        .deepseek
        .push(MockOutcome::Upstream {
            status: 503,
            body: "overloaded".into(),
        })
        .await;
    let (status, _, body) = harness.send(completion(math_question(), Some(KEY))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn streaming_completion_emits_deltas_then_summary() {
    let harness = Harness::new(quiet_config());
    harness.deepseek.push_reply("x equals two").await;

    let mut body = math_question();
    body["stream"] = json!(true);
    let (status, headers, text) = harness.send(completion(body, Some(KEY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");

    let frames: Vec<Value> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();
    let deltas: String = frames
        .iter()
        .filter_map(|f| f["content"].as_str())
        .collect();
    assert_eq!(deltas, "x equals two");

    let summary = frames.last().unwrap();
    assert_eq!(summary["done"], true);
    assert_eq!(summary["model_used"], "deepseek-chat");
    assert_eq!(summary["tokens_used"], 30);
}

#[tokio::test]
async fn health_is_public() {
    let harness = Harness::new(quiet_config());
    let (status, _, body) = harness.send(get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn models_lists_every_profile_with_pricing() {
    let harness = Harness::new(quiet_config());
    for path in ["/models", "/api/v1/models/available"] {
        let (status, _, body) = harness.send(get(path, None)).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        let models = body["models"].as_array().unwrap();
        assert!(models.contains(&json!("deepseek-coder")));
        assert!(models.contains(&json!("gpt-4o-mini")));
        assert_eq!(body["pricing"]["gpt-4o-mini"]["provider"], "openai");
        assert_eq!(body["pricing"].as_object().unwrap().len(), models.len());
    }
}

#[tokio::test]
async fn status_reports_features_and_providers() {
    let harness = Harness::new(quiet_config());
    let (status, _, body) = harness.send(get("/status", None)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["mode"], "development");
    assert_eq!(body["features"]["caching"], true);
    assert_eq!(body["features"]["rate_limiting"], true);
    assert_eq!(body["features"]["quality_evaluation"], false);
    assert_eq!(body["features"]["escalation"], false);
    assert_eq!(body["rate_limit"]["max_requests"], 100);
    assert_eq!(body["rate_limit"]["window_secs"], 900);
    assert_eq!(body["providers"].as_object().unwrap().len(), 4);
    assert_eq!(body["providers"]["deepseek"]["status"], "healthy");
}

#[tokio::test]
async fn metrics_endpoint_depends_on_render_fn() {
    let harness = Harness::new(quiet_config());
    let (status, _, _) = harness.send(get("/metrics", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let harness = Harness::with_metrics(quiet_config(), Some("frugal_requests_total 3\n"));
    let (status, _, body) = harness.send(get("/metrics", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "frugal_requests_total 3\n");
}
