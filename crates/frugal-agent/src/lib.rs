// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decision-and-dispatch pipeline for the Frugal completion router.
//!
//! The [`CompletionPipeline`] is the central coordinator that:
//! - Serves repeated non-streaming requests from the [`ResponseCache`]
//! - Classifies each request and selects its initial model
//! - Dispatches to the provider adapter that serves that model
//! - Grades the answer with the [`QualityJudge`] and escalates once on failure
//! - Accumulates cost across attempts and stores the final record

pub mod cache;
pub mod judge;
pub mod record;
pub mod retry;
pub mod stream;
mod telemetry;

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use frugal_config::FrugalConfig;
use frugal_core::{
    FrugalError, ModelId, ProviderAdapter, ProviderKind, ProviderRequest, ProviderResponse,
    ProviderStream, RequestSpec, TokenEstimator, TokenUsage, last_user_message,
};
use frugal_cost::{CostBreakdown, CostCalculator, ModelRegistry, round_usd};
use frugal_router::ModelRouter;
use tracing::{debug, info, warn};

pub use cache::{CacheStats, ResponseCache, cache_key};
pub use judge::QualityJudge;
pub use record::{CompletionRecord, EvaluationSummary, StreamEvent, StreamSummary};
pub use retry::RetryEscalationPolicy;
pub use stream::{EventStream, StreamAggregator};

/// One adapter per backend, looked up by the provider of the chosen model.
#[derive(Clone, Default)]
pub struct ProviderSet {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` under its own [`ProviderKind`], replacing any previous one.
    pub fn insert(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn with(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.insert(adapter);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Result<&Arc<dyn ProviderAdapter>, FrugalError> {
        self.adapters
            .get(&kind)
            .ok_or_else(|| FrugalError::Config(format!("no adapter registered for {kind}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProviderKind, &Arc<dyn ProviderAdapter>)> {
        self.adapters.iter()
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.adapters.keys()).finish()
    }
}

/// Routes, dispatches, grades, escalates, prices, and caches completions.
#[derive(Clone)]
pub struct CompletionPipeline {
    router: ModelRouter,
    estimator: TokenEstimator,
    registry: ModelRegistry,
    calculator: CostCalculator,
    providers: ProviderSet,
    judge: Arc<QualityJudge>,
    policy: RetryEscalationPolicy,
    cache: Option<Arc<ResponseCache>>,
    upstream_timeout: Duration,
}

impl std::fmt::Debug for CompletionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionPipeline")
            .field("providers", &self.providers)
            .field("judge", &self.judge)
            .field("policy", &self.policy)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

impl CompletionPipeline {
    /// Wires the pipeline from configuration and a set of adapters.
    ///
    /// # Errors
    /// Returns [`FrugalError::Config`] if the judge model is unknown or its
    /// provider has no registered adapter.
    pub fn new(
        config: &FrugalConfig,
        providers: ProviderSet,
        estimator: TokenEstimator,
    ) -> Result<Self, FrugalError> {
        let registry = ModelRegistry::new();

        let judge = if config.quality.enabled {
            let judge_model = ModelId::from_str(&config.quality.judge_model).map_err(|_| {
                FrugalError::Config(format!(
                    "unknown judge model '{}'",
                    config.quality.judge_model
                ))
            })?;
            let profile = registry.profile(judge_model);
            QualityJudge::new(providers.get(profile.provider)?.clone(), profile)
        } else {
            QualityJudge::disabled()
        };

        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(ResponseCache::new(Duration::from_secs(config.cache.ttl_secs))));

        info!(
            providers = ?providers,
            judge = ?judge.model(),
            cache = cache.is_some(),
            max_retries = config.quality.max_retries,
            "completion pipeline initialized"
        );

        Ok(Self {
            router: ModelRouter::new(estimator.clone()),
            estimator,
            registry,
            calculator: CostCalculator::new(registry),
            providers,
            judge: Arc::new(judge),
            policy: RetryEscalationPolicy::new(config.quality.max_retries),
            cache,
            upstream_timeout: Duration::from_secs(config.upstream.timeout_secs),
        })
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    pub fn registry(&self) -> ModelRegistry {
        self.registry
    }

    /// Serves a non-streaming request, from cache when possible.
    pub async fn complete(&self, spec: &RequestSpec) -> Result<CompletionRecord, FrugalError> {
        let key = self.cache.as_ref().map(|_| cache_key(spec));

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            let hit = cache.get(key);
            telemetry::cache_lookup(hit.is_some());
            if let Some(record) = hit {
                debug!(model = %record.model_used, "served from cache");
                return Ok(record.into_cached());
            }
        }

        let record = self.complete_uncached(spec).await?;

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, record.clone());
        }
        Ok(record)
    }

    async fn complete_uncached(&self, spec: &RequestSpec) -> Result<CompletionRecord, FrugalError> {
        let mut decision = self.router.route(spec);
        let prompt = last_user_message(&spec.messages).unwrap_or_default();

        let mut model = decision.initial_model;
        let mut attempt = 0u32;
        let mut total_cost = CostBreakdown::default();
        let mut total_usage = TokenUsage::default();

        let (response, evaluation) = loop {
            let response = self.dispatch(model, spec).await?;
            let breakdown = self.calculator.breakdown(model, &response.usage);
            total_cost.accumulate(breakdown);
            total_usage.input_tokens += response.usage.input_tokens;
            total_usage.output_tokens += response.usage.output_tokens;

            let evaluation = self.judge.evaluate(prompt, &response.content, model).await;
            info!(
                attempt,
                %model,
                score = evaluation.score,
                passed = evaluation.passed,
                cost_usd = breakdown.cost,
                "attempt evaluated"
            );

            match self.policy.next_model(attempt, model, &evaluation) {
                Some(next) => {
                    warn!(from = %model, to = %next, score = evaluation.score, "quality below threshold, escalating");
                    telemetry::escalation(model, next);
                    model = next;
                    attempt += 1;
                }
                None => break (response, evaluation),
            }
        };

        decision.final_model = model;
        decision.retry_count = attempt;
        telemetry::completion(model, decision.intent, &total_usage, total_cost.cost);

        Ok(CompletionRecord {
            response: response.content,
            model_used: model,
            intent_detected: decision.intent,
            complexity_level: decision.complexity,
            estimated_cost: round_usd(total_cost.cost),
            tokens_used: total_usage.total(),
            savings_vs_gpt4: round_usd(total_cost.savings()),
            quality_score: evaluation.score,
            quality_passed: evaluation.passed,
            retried: attempt > 0,
            retry_count: attempt,
            evaluation: EvaluationSummary::from(&evaluation),
            routing_decision: decision,
            cached: None,
            cache_saved_cost: None,
        })
    }

    /// Opens an upstream stream and returns client events.
    ///
    /// Failures before the first byte (missing credential, non-success
    /// status) are returned as errors; later failures become a terminal
    /// error event.
    pub async fn stream(&self, spec: &RequestSpec) -> Result<EventStream, FrugalError> {
        let decision = self.router.route(spec);
        let profile = self.registry.profile(decision.initial_model);
        let provider = self.providers.get(profile.provider)?;

        let upstream: ProviderStream = provider
            .stream(self.provider_request(decision.initial_model, spec, true))
            .await?;

        Ok(stream::aggregate(
            upstream,
            stream::StreamContext {
                prompt: last_user_message(&spec.messages)
                    .unwrap_or_default()
                    .to_string(),
                decision,
                estimator: self.estimator.clone(),
                calculator: self.calculator,
                judge: Arc::clone(&self.judge),
                idle_timeout: self.upstream_timeout,
            },
        ))
    }

    async fn dispatch(
        &self,
        model: ModelId,
        spec: &RequestSpec,
    ) -> Result<ProviderResponse, FrugalError> {
        let provider = self.registry.profile(model).provider;
        let adapter = self.providers.get(provider)?;

        let started = Instant::now();
        let result = adapter
            .complete(self.provider_request(model, spec, false))
            .await;
        telemetry::upstream_latency(provider, started.elapsed().as_secs_f64());

        result.inspect_err(|e| warn!(%provider, %model, error = %e, "provider call failed"))
    }

    fn provider_request(&self, model: ModelId, spec: &RequestSpec, stream: bool) -> ProviderRequest {
        ProviderRequest {
            model: self.registry.profile(model).api_model.to_string(),
            messages: spec.messages.clone(),
            max_tokens: spec.max_tokens,
            temperature: spec.temperature,
            stream,
        }
    }
}
