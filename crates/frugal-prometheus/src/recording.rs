// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a
//! no-op, so the pipeline can record unconditionally.

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all Frugal metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "frugal_requests_total",
        "Completion requests served, by final model and intent"
    );
    describe_counter!("frugal_tokens_total", "Tokens consumed upstream");
    describe_gauge!(
        "frugal_cost_usd_total",
        "Estimated upstream spend in USD"
    );
    describe_counter!(
        "frugal_cache_lookups_total",
        "Response cache lookups by result"
    );
    describe_counter!(
        "frugal_escalations_total",
        "Quality-driven model escalations"
    );
    describe_counter!(
        "frugal_judge_fallbacks_total",
        "Quality evaluations that fell back to the default verdict"
    );
    describe_histogram!(
        "frugal_upstream_latency_seconds",
        "Upstream provider call latency in seconds"
    );
}

/// Record a served completion.
pub fn record_request(model: &str, intent: &str) {
    metrics::counter!(
        "frugal_requests_total",
        "model" => model.to_string(),
        "intent" => intent.to_string()
    )
    .increment(1);
}

/// Record token consumption.
pub fn record_tokens(model: &str, input: u32, output: u32) {
    metrics::counter!("frugal_tokens_total", "model" => model.to_string(), "type" => "input")
        .increment(u64::from(input));
    metrics::counter!("frugal_tokens_total", "model" => model.to_string(), "type" => "output")
        .increment(u64::from(output));
}

/// Record estimated spend. A monotonically increased gauge, since counters are integral.
pub fn record_cost(model: &str, usd: f64) {
    metrics::gauge!("frugal_cost_usd_total", "model" => model.to_string()).increment(usd);
}

/// Record a cache lookup; `hit` selects the `result` label.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("frugal_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_escalation(from: &str, to: &str) {
    metrics::counter!(
        "frugal_escalations_total",
        "from" => from.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}

pub fn record_judge_fallback() {
    metrics::counter!("frugal_judge_fallbacks_total").increment(1);
}

/// Record upstream call latency.
pub fn record_latency(provider: &str, seconds: f64) {
    metrics::histogram!("frugal_upstream_latency_seconds", "provider" => provider.to_string())
        .record(seconds);
}
