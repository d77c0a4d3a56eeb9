// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Frugal completion router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use frugal_core::ProviderKind;
use serde::{Deserialize, Serialize};

/// Top-level Frugal configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FrugalConfig {
    /// Listener and runtime mode.
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared-secret client authentication.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Backend credentials and endpoints.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Upstream call limits.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-client rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Quality judge and escalation settings.
    #[serde(default)]
    pub quality: QualityConfig,

    /// Prometheus metrics export.
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

/// Deployment mode. Development enables the documented auth bypass key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    #[default]
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "prod")]
    Production,
}

impl std::fmt::Display for ServerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Listener and runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Development or production.
    #[serde(default)]
    pub mode: ServerMode,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mode: ServerMode::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Shared-secret authentication for the protected routes.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// The configured secret. Required in production.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Key accepted in development mode when `api_key` is unset.
    #[serde(default = "default_dev_api_key")]
    pub dev_api_key: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("dev_api_key", &"[redacted]")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            dev_api_key: default_dev_api_key(),
        }
    }
}

fn default_dev_api_key() -> String {
    "dev-key-123".to_string()
}

/// Credentials and endpoints for every backend.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    pub deepseek: ProviderConfig,

    #[serde(default)]
    pub qwen: ProviderConfig,
}

impl ProvidersConfig {
    /// Resolves a backend credential: config value, then the conventional
    /// environment variable. Empty strings count as absent.
    pub fn resolve_api_key(&self, kind: ProviderKind) -> Option<String> {
        let configured = match kind {
            ProviderKind::OpenAi => &self.openai.api_key,
            ProviderKind::Anthropic => &self.anthropic.api_key,
            ProviderKind::DeepSeek => &self.deepseek.api_key,
            ProviderKind::Qwen => &self.qwen.api_key,
        };
        if let Some(key) = configured
            && !key.is_empty()
        {
            return Some(key.clone());
        }
        std::env::var(credential_env_var(kind))
            .ok()
            .filter(|k| !k.is_empty())
    }

    /// The base URL for a backend: configured override or the public default.
    pub fn base_url(&self, kind: ProviderKind) -> String {
        let configured = match kind {
            ProviderKind::OpenAi => &self.openai.base_url,
            ProviderKind::Anthropic => &self.anthropic.base_url,
            ProviderKind::DeepSeek => &self.deepseek.base_url,
            ProviderKind::Qwen => &self.qwen.base_url,
        };
        configured
            .clone()
            .unwrap_or_else(|| default_base_url(kind).to_string())
    }
}

/// Conventional environment variable holding a backend credential.
pub fn credential_env_var(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "OPENAI_API_KEY",
        ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
        ProviderKind::Qwen => "DASHSCOPE_API_KEY",
    }
}

/// Public API root for a backend.
pub fn default_base_url(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "https://api.openai.com/v1",
        ProviderKind::Anthropic => "https://api.anthropic.com/v1",
        ProviderKind::DeepSeek => "https://api.deepseek.com/v1",
        ProviderKind::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
    }
}

/// An OpenAI-compatible backend.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Overrides the public API root.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Anthropic Messages API settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    /// Value of the `anthropic-version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            api_version: default_api_version(),
        }
    }
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Limits applied to every upstream call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Buffered calls: whole-call deadline. Streaming: connect and idle deadline.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lifetime of a cached response.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Interval between background sweeps of expired entries.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    600
}

/// Per-client fixed-window rate limiting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Accepted requests per window per client address.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    900
}

/// Quality judge and escalation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QualityConfig {
    /// When false, every response receives the neutral passing verdict.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Model used to score responses.
    #[serde(default = "default_judge_model")]
    pub judge_model: String,

    /// Escalation retries after a failed verdict (0 or 1).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            judge_model: default_judge_model(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_judge_model() -> String {
    "deepseek-chat".to_string()
}

fn default_max_retries() -> u32 {
    1
}

/// Prometheus metrics export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}
