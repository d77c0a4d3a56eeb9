// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric hooks. Compiled to no-ops unless the `prometheus` feature is on.

use frugal_core::{ModelId, ProviderKind, TokenUsage};
use frugal_router::Intent;

#[cfg(feature = "prometheus")]
pub(crate) fn completion(model: ModelId, intent: Intent, usage: &TokenUsage, cost: f64) {
    let model = model.to_string();
    frugal_prometheus::record_request(&model, &intent.to_string());
    frugal_prometheus::record_tokens(&model, usage.input_tokens, usage.output_tokens);
    frugal_prometheus::record_cost(&model, cost);
}

#[cfg(not(feature = "prometheus"))]
pub(crate) fn completion(_model: ModelId, _intent: Intent, _usage: &TokenUsage, _cost: f64) {}

#[cfg(feature = "prometheus")]
pub(crate) fn cache_lookup(hit: bool) {
    frugal_prometheus::record_cache_lookup(hit);
}

#[cfg(not(feature = "prometheus"))]
pub(crate) fn cache_lookup(_hit: bool) {}

#[cfg(feature = "prometheus")]
pub(crate) fn escalation(from: ModelId, to: ModelId) {
    frugal_prometheus::record_escalation(&from.to_string(), &to.to_string());
}

#[cfg(not(feature = "prometheus"))]
pub(crate) fn escalation(_from: ModelId, _to: ModelId) {}

#[cfg(feature = "prometheus")]
pub(crate) fn judge_fallback() {
    frugal_prometheus::record_judge_fallback();
}

#[cfg(not(feature = "prometheus"))]
pub(crate) fn judge_fallback() {}

#[cfg(feature = "prometheus")]
pub(crate) fn upstream_latency(provider: ProviderKind, seconds: f64) {
    frugal_prometheus::record_latency(&provider.to_string(), seconds);
}

#[cfg(not(feature = "prometheus"))]
pub(crate) fn upstream_latency(_provider: ProviderKind, _seconds: f64) {}
