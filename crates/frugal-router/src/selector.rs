// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model selection policy and the escalation ladder.
//!
//! Both are pure functions: identical inputs always yield the same model.

use frugal_core::ModelId;

use crate::classifier::{ComplexityTier, Intent};

/// Chooses the model for a classified request.
///
/// Intent rules take precedence; only `General` falls through to the
/// complexity tiers.
pub fn select_model(complexity: ComplexityTier, intent: Intent, prefer_cost: bool) -> ModelId {
    match intent {
        Intent::Coding => ModelId::DeepSeekCoder,
        Intent::Math | Intent::SimpleQa => ModelId::DeepSeekChat,
        Intent::Translation => ModelId::QwenTurbo,
        Intent::Creative | Intent::Analysis => {
            if prefer_cost {
                ModelId::QwenPlus
            } else {
                ModelId::Claude35Sonnet
            }
        }
        Intent::General => match (complexity, prefer_cost) {
            (ComplexityTier::Simple, true) => ModelId::DeepSeekChat,
            (ComplexityTier::Medium, true) => ModelId::QwenTurbo,
            (ComplexityTier::Complex, true) => ModelId::QwenPlus,
            (ComplexityTier::Simple, false) => ModelId::Gpt4oMini,
            (ComplexityTier::Medium, false) => ModelId::QwenPlus,
            (ComplexityTier::Complex, false) => ModelId::Claude35Sonnet,
        },
    }
}

/// The next stronger model after a failed quality check, if any.
pub fn escalate(model: ModelId) -> Option<ModelId> {
    match model {
        ModelId::DeepSeekCoder | ModelId::DeepSeekChat | ModelId::QwenTurbo | ModelId::Gpt4oMini => {
            Some(ModelId::QwenPlus)
        }
        ModelId::QwenPlus => Some(ModelId::Claude35Sonnet),
        ModelId::Claude35Sonnet => None,
    }
}
