// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing: classify a request and pick its first model.

use frugal_core::{ModelId, RequestSpec, TokenEstimator};
use serde::Serialize;
use tracing::info;

use crate::classifier::{
    ComplexityClassifier, ComplexityTier, Intent, IntentClassifier, tier_for_total,
};
use crate::selector::select_model;

/// Everything the router decided for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub intent: Intent,
    pub complexity: ComplexityTier,
    /// Estimated input tokens that fed the complexity tier.
    pub estimated_input_tokens: u32,
    /// Model chosen by selection, before any escalation.
    pub initial_model: ModelId,
    /// Model whose response was returned.
    pub final_model: ModelId,
    /// Extra attempts made after a failed quality check (0 or 1).
    pub retry_count: u32,
}

/// Combines both classifiers with the selection policy.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    complexity: ComplexityClassifier,
    intent: IntentClassifier,
}

impl ModelRouter {
    pub fn new(estimator: TokenEstimator) -> Self {
        Self {
            complexity: ComplexityClassifier::new(estimator),
            intent: IntentClassifier::new(),
        }
    }

    /// Classifies `spec` and selects its initial model.
    pub fn route(&self, spec: &RequestSpec) -> RoutingDecision {
        let estimated_input_tokens = self.complexity.input_tokens(&spec.messages);
        let complexity =
            tier_for_total(estimated_input_tokens.saturating_add(spec.max_tokens));
        let intent = self.intent.classify(&spec.messages);
        let model = select_model(complexity, intent, spec.prefer_cost);

        info!(
            %intent,
            %complexity,
            %model,
            prefer_cost = spec.prefer_cost,
            estimated_input_tokens,
            "routed request"
        );

        RoutingDecision {
            intent,
            complexity,
            estimated_input_tokens,
            initial_model: model,
            final_model: model,
            retry_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use frugal_core::ChatMessage;

    use super::*;

    fn router() -> ModelRouter {
        ModelRouter::new(TokenEstimator::word_heuristic())
    }

    #[test]
    fn reverse_string_routes_to_coder() {
        let spec = RequestSpec::new(vec![ChatMessage::user("Write a function to reverse a string")]);
        let decision = router().route(&spec);
        assert_eq!(decision.intent, Intent::Coding);
        assert_eq!(decision.initial_model, ModelId::DeepSeekCoder);
        assert_eq!(decision.retry_count, 0);
    }

    #[test]
    fn percentage_routes_to_cheapest_chat() {
        let spec = RequestSpec::new(vec![ChatMessage::user("Calculate 15% of 250")]);
        let decision = router().route(&spec);
        assert_eq!(decision.intent, Intent::Math);
        assert_eq!(decision.initial_model, ModelId::DeepSeekChat);
    }

    #[test]
    fn creative_prompt_respects_cost_preference() {
        let mut spec = RequestSpec::new(vec![ChatMessage::user(
            "Write a story about a dragon who learns to fly",
        )]);
        spec.prefer_cost = false;
        assert_eq!(router().route(&spec).initial_model, ModelId::Claude35Sonnet);
        spec.prefer_cost = true;
        assert_eq!(router().route(&spec).initial_model, ModelId::QwenPlus);
    }

    #[test]
    fn default_budget_makes_short_prompts_medium() {
        // 1000 max_tokens alone puts a short prompt in the medium tier.
        let spec = RequestSpec::new(vec![ChatMessage::user("Tell me about the weather today")]);
        let decision = router().route(&spec);
        assert_eq!(decision.complexity, ComplexityTier::Medium);
        assert_eq!(decision.initial_model, ModelId::QwenTurbo);
    }

    #[test]
    fn decision_serializes_with_wire_names() {
        let spec = RequestSpec::new(vec![ChatMessage::user("Who is Ada Lovelace?")]);
        let json = serde_json::to_value(router().route(&spec)).expect("ser");
        assert_eq!(json["intent"], "simple-qa");
        assert_eq!(json["initial_model"], "deepseek-chat");
        assert_eq!(json["complexity"], "medium");
    }
}
