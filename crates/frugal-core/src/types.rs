// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the router, the adapters, and the HTTP surface.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Author of a [`ChatMessage`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation. Order within a conversation is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Returns the content of the last user-authored message, if any.
pub fn last_user_message(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

/// Default generation budget when the client omits `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default sampling temperature when the client omits `temperature`.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A validated inbound completion request. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub prefer_cost: bool,
    pub stream: bool,
}

impl RequestSpec {
    /// Builds a request with the documented defaults for every optional field.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            prefer_cost: true,
            stream: false,
        }
    }
}

/// The upstream backends the router can dispatch to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    Anthropic,
    #[serde(rename = "deepseek")]
    #[strum(serialize = "deepseek")]
    DeepSeek,
    Qwen,
}

/// Every model the router knows how to select.
///
/// Closed set: each variant has exactly one profile in the model registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum ModelId {
    #[serde(rename = "deepseek-coder")]
    #[strum(serialize = "deepseek-coder")]
    DeepSeekCoder,
    #[serde(rename = "deepseek-chat")]
    #[strum(serialize = "deepseek-chat")]
    DeepSeekChat,
    #[serde(rename = "qwen-turbo")]
    #[strum(serialize = "qwen-turbo")]
    QwenTurbo,
    #[serde(rename = "qwen-plus")]
    #[strum(serialize = "qwen-plus")]
    QwenPlus,
    #[serde(rename = "gpt-4o-mini")]
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "claude-3-5-sonnet")]
    #[strum(serialize = "claude-3-5-sonnet")]
    Claude35Sonnet,
}

/// Token accounting reported by a backend (or estimated when it is not).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A request to a single backend, already resolved to its wire model name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub stream: bool,
}

/// A buffered response from a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// Kind of a normalized streaming chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEventType {
    /// Stream opened; may carry input token usage.
    MessageStart,
    /// A text fragment.
    ContentBlockDelta,
    /// Usage or stop-reason update.
    MessageDelta,
    /// The backend finished the message.
    MessageStop,
    /// The backend reported an error mid-stream.
    Error,
}

/// A single normalized chunk from a streaming backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStreamChunk {
    pub event_type: StreamEventType,
    pub text: Option<String>,
    pub usage: Option<TokenUsage>,
    pub error: Option<String>,
}

impl ProviderStreamChunk {
    pub fn text(fragment: impl Into<String>) -> Self {
        Self {
            event_type: StreamEventType::ContentBlockDelta,
            text: Some(fragment.into()),
            usage: None,
            error: None,
        }
    }

    pub fn usage(event_type: StreamEventType, usage: TokenUsage) -> Self {
        Self {
            event_type,
            text: None,
            usage: Some(usage),
            error: None,
        }
    }

    pub fn stop() -> Self {
        Self {
            event_type: StreamEventType::MessageStop,
            text: None,
            usage: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            event_type: StreamEventType::Error,
            text: None,
            usage: None,
            error: Some(message.into()),
        }
    }
}

/// Minimum judge score for a response to pass.
pub const PASS_THRESHOLD: f64 = 7.0;

/// A quality verdict on one generated response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Always within `[0, 10]`.
    pub score: f64,
    pub reasoning: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub passed: bool,
}

impl Evaluation {
    /// Clamps `score` into range and derives `passed` from [`PASS_THRESHOLD`].
    pub fn new(
        score: f64,
        reasoning: impl Into<String>,
        strengths: Vec<String>,
        weaknesses: Vec<String>,
    ) -> Self {
        let score = score.clamp(0.0, 10.0);
        Self {
            score,
            reasoning: reasoning.into(),
            strengths,
            weaknesses,
            passed: score >= PASS_THRESHOLD,
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
