// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The model registry: every selectable model with its backend and price.
//!
//! Prices are USD per 1K tokens.
//!
//! | model             | input   | output  |
//! |-------------------|---------|---------|
//! | deepseek-coder    | 0.00014 | 0.00028 |
//! | deepseek-chat     | 0.00014 | 0.00028 |
//! | qwen-turbo        | 0.00005 | 0.0002  |
//! | qwen-plus         | 0.0004  | 0.0012  |
//! | gpt-4o-mini       | 0.00015 | 0.0006  |
//! | claude-3-5-sonnet | 0.003   | 0.015   |

use frugal_core::{ModelId, ProviderKind};
use serde::Serialize;
use strum::IntoEnumIterator;

/// Static description of one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelProfile {
    pub id: ModelId,
    pub provider: ProviderKind,
    /// Model name sent on the wire.
    pub api_model: &'static str,
    pub input_per_k: f64,
    pub output_per_k: f64,
}

impl ModelProfile {
    pub fn input_per_million(&self) -> f64 {
        self.input_per_k * 1000.0
    }

    pub fn output_per_million(&self) -> f64 {
        self.output_per_k * 1000.0
    }
}

const DEEPSEEK_CODER: ModelProfile = ModelProfile {
    id: ModelId::DeepSeekCoder,
    provider: ProviderKind::DeepSeek,
    api_model: "deepseek-coder",
    input_per_k: 0.00014,
    output_per_k: 0.00028,
};

const DEEPSEEK_CHAT: ModelProfile = ModelProfile {
    id: ModelId::DeepSeekChat,
    provider: ProviderKind::DeepSeek,
    api_model: "deepseek-chat",
    input_per_k: 0.00014,
    output_per_k: 0.00028,
};

const QWEN_TURBO: ModelProfile = ModelProfile {
    id: ModelId::QwenTurbo,
    provider: ProviderKind::Qwen,
    api_model: "qwen-turbo",
    input_per_k: 0.00005,
    output_per_k: 0.0002,
};

const QWEN_PLUS: ModelProfile = ModelProfile {
    id: ModelId::QwenPlus,
    provider: ProviderKind::Qwen,
    api_model: "qwen-plus",
    input_per_k: 0.0004,
    output_per_k: 0.0012,
};

const GPT_4O_MINI: ModelProfile = ModelProfile {
    id: ModelId::Gpt4oMini,
    provider: ProviderKind::OpenAi,
    api_model: "gpt-4o-mini",
    input_per_k: 0.00015,
    output_per_k: 0.0006,
};

const CLAUDE_3_5_SONNET: ModelProfile = ModelProfile {
    id: ModelId::Claude35Sonnet,
    provider: ProviderKind::Anthropic,
    api_model: "claude-3-5-sonnet-20241022",
    input_per_k: 0.003,
    output_per_k: 0.015,
};

/// Read-only table of model profiles, shared process-wide without locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelRegistry;

impl ModelRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Every model resolves: the match is exhaustive over [`ModelId`].
    pub fn profile(&self, id: ModelId) -> &'static ModelProfile {
        match id {
            ModelId::DeepSeekCoder => &DEEPSEEK_CODER,
            ModelId::DeepSeekChat => &DEEPSEEK_CHAT,
            ModelId::QwenTurbo => &QWEN_TURBO,
            ModelId::QwenPlus => &QWEN_PLUS,
            ModelId::Gpt4oMini => &GPT_4O_MINI,
            ModelId::Claude35Sonnet => &CLAUDE_3_5_SONNET,
        }
    }

    /// All profiles in declaration order.
    pub fn profiles(&self) -> impl Iterator<Item = &'static ModelProfile> + '_ {
        ModelId::iter().map(|id| self.profile(id))
    }
}
