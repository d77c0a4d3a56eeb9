// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::str::FromStr;

use frugal_core::ModelId;

use crate::diagnostic::ConfigError;
use crate::model::{FrugalConfig, ServerMode};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &FrugalConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!("server.host `{host}` is not a valid IP address or hostname"));
    }

    if config.server.port == 0 {
        fail("server.port must be non-zero".to_string());
    }

    if config.server.mode == ServerMode::Production
        && config.auth.api_key.as_deref().is_none_or(str::is_empty)
    {
        fail("auth.api_key is required in production mode".to_string());
    }

    if config.upstream.timeout_secs == 0 {
        fail("upstream.timeout_secs must be greater than zero".to_string());
    }

    if config.cache.ttl_secs == 0 {
        fail("cache.ttl_secs must be greater than zero".to_string());
    }

    if config.cache.sweep_interval_secs == 0 {
        fail("cache.sweep_interval_secs must be greater than zero".to_string());
    }

    if config.rate_limit.max_requests == 0 {
        fail("rate_limit.max_requests must be greater than zero".to_string());
    }

    if config.rate_limit.window_secs == 0 {
        fail("rate_limit.window_secs must be greater than zero".to_string());
    }

    if config.quality.max_retries > 1 {
        fail(format!(
            "quality.max_retries must be 0 or 1, got {}",
            config.quality.max_retries
        ));
    }

    if ModelId::from_str(&config.quality.judge_model).is_err() {
        fail(format!(
            "quality.judge_model `{}` is not a known model",
            config.quality.judge_model
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
