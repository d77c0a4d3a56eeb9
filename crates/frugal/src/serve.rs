// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `frugal serve` command implementation.
//!
//! Builds one adapter per backend, assembles the completion pipeline, starts
//! the background sweepers, and serves the gateway until a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use frugal_agent::{CompletionPipeline, ProviderSet};
use frugal_anthropic::AnthropicProvider;
use frugal_config::FrugalConfig;
use frugal_core::{FrugalError, ProviderKind, TokenEstimator};
use frugal_gateway::GatewayState;
use frugal_openai::CompatProvider;
use tracing::info;

use crate::shutdown;

fn build_providers(config: &FrugalConfig) -> Result<ProviderSet, FrugalError> {
    let mut providers = ProviderSet::new().with(Arc::new(AnthropicProvider::new(config)?));
    for kind in [ProviderKind::OpenAi, ProviderKind::DeepSeek, ProviderKind::Qwen] {
        providers.insert(Arc::new(CompatProvider::from_config(kind, config)?));
    }
    Ok(providers)
}

#[cfg(feature = "prometheus")]
fn attach_metrics(config: &FrugalConfig, state: GatewayState) -> Result<GatewayState, FrugalError> {
    if !config.prometheus.enabled {
        return Ok(state);
    }
    let adapter = frugal_prometheus::PrometheusAdapter::new()?;
    Ok(state.with_metrics(Arc::new(move || adapter.render())))
}

#[cfg(not(feature = "prometheus"))]
fn attach_metrics(_config: &FrugalConfig, state: GatewayState) -> Result<GatewayState, FrugalError> {
    Ok(state)
}

/// Runs the `frugal serve` command.
pub async fn run_serve(config: FrugalConfig) -> Result<(), FrugalError> {
    init_tracing(&config.server.log_level);

    info!(mode = %config.server.mode, "starting frugal serve");

    let providers = build_providers(&config)?;
    let pipeline = CompletionPipeline::new(&config, providers, TokenEstimator::new())?;
    let state = attach_metrics(&config, GatewayState::from_config(&config, pipeline.clone()))?;

    let cancel = shutdown::install_signal_handler();

    let mut background = Vec::new();
    if let Some(cache) = pipeline.cache() {
        background.push(cache.clone().spawn_sweeper(
            Duration::from_secs(config.cache.sweep_interval_secs),
            cancel.clone(),
        ));
    }
    if let Some(limiter) = state.limiter.clone() {
        background.push(limiter.spawn_purger(cancel.clone()));
    }

    let result = frugal_gateway::start_server(
        &config.server.host,
        config.server.port,
        state,
        cancel.clone(),
    )
    .await;

    cancel.cancel();
    for task in background {
        let _ = task.await;
    }

    info!("frugal serve shutdown complete");
    result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("frugal={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
