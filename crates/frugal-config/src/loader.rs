// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./frugal.toml` > `~/.config/frugal/frugal.toml`
//! > `/etc/frugal/frugal.toml`, with `FRUGAL_*` environment overrides and a
//! handful of conventional variable names (`PORT`, `ROUTER_API_KEY`,
//! `NODE_ENV`).

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FrugalConfig;

/// Sections reachable through `FRUGAL_<SECTION>_<KEY>` variables.
///
/// Longer prefixes come first so `providers_openai_` wins over any shorter match.
const ENV_SECTIONS: &[&str] = &[
    "providers_anthropic",
    "providers_deepseek",
    "providers_openai",
    "providers_qwen",
    "rate_limit",
    "prometheus",
    "upstream",
    "quality",
    "server",
    "cache",
    "auth",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/frugal/frugal.toml` (system-wide)
/// 3. `~/.config/frugal/frugal.toml` (user XDG config)
/// 4. `./frugal.toml` (local directory)
/// 5. `NODE_ENV` (server mode)
/// 6. `FRUGAL_*` environment variables, `FRUGAL_MODE` included
/// 7. `PORT` and `ROUTER_API_KEY`
pub fn load_config() -> Result<FrugalConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<FrugalConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FrugalConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FrugalConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FrugalConfig::default()))
        .merge(Toml::file(path))
        .merge(node_env_provider())
        .merge(env_provider())
        .merge(conventional_env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FrugalConfig::default()))
        .merge(Toml::file("/etc/frugal/frugal.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("frugal/frugal.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("frugal.toml"))
        .merge(node_env_provider())
        .merge(env_provider())
        .merge(conventional_env_provider())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
///
/// Uses an explicit section table rather than splitting on `_`, since key
/// names themselves contain underscores (`FRUGAL_CACHE_TTL_SECS` must map to
/// `cache.ttl_secs`, not `cache.ttl.secs`).
pub fn map_env_key(key: &str) -> String {
    if key == "mode" {
        return "server.mode".to_string();
    }
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{}.{rest}", section.replacen("providers_", "providers.", 1));
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("FRUGAL_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// `NODE_ENV` selects the server mode unless `FRUGAL_MODE` overrides it.
fn node_env_provider() -> Env {
    Env::raw()
        .only(&["NODE_ENV"])
        .map(|_| "server.mode".into())
}

/// `PORT` and `ROUTER_API_KEY`, the names most deployments already set.
fn conventional_env_provider() -> Env {
    Env::raw()
        .only(&["PORT", "ROUTER_API_KEY"])
        .map(|key| match key.as_str().to_ascii_lowercase().as_str() {
            "port" => "server.port".into(),
            _ => "auth.api_key".into(),
        })
}
