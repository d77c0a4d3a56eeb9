// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response shapes produced by the pipeline.

use frugal_core::{Evaluation, ModelId};
use frugal_router::{ComplexityTier, Intent, RoutingDecision};
use serde::Serialize;

/// The verdict fields echoed back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub reasoning: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl From<&Evaluation> for EvaluationSummary {
    fn from(evaluation: &Evaluation) -> Self {
        Self {
            reasoning: evaluation.reasoning.clone(),
            strengths: evaluation.strengths.clone(),
            weaknesses: evaluation.weaknesses.clone(),
        }
    }
}

/// A complete non-streaming answer. This is also what the cache stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRecord {
    pub response: String,
    pub model_used: ModelId,
    pub intent_detected: Intent,
    pub complexity_level: ComplexityTier,
    /// Sum over every attempt, in USD.
    pub estimated_cost: f64,
    /// Sum over every attempt.
    pub tokens_used: u32,
    pub savings_vs_gpt4: f64,
    pub quality_score: f64,
    pub quality_passed: bool,
    pub retried: bool,
    pub retry_count: u32,
    pub evaluation: EvaluationSummary,
    pub routing_decision: RoutingDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_saved_cost: Option<f64>,
}

impl CompletionRecord {
    /// Marks a stored record as served from cache.
    pub fn into_cached(mut self) -> Self {
        self.cached = Some(true);
        self.cache_saved_cost = Some(self.estimated_cost);
        self
    }
}

/// Final frame of a streamed answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSummary {
    pub done: bool,
    pub model_used: ModelId,
    pub intent_detected: Intent,
    pub complexity_level: ComplexityTier,
    pub estimated_cost: f64,
    pub tokens_used: u32,
    pub savings_vs_gpt4: f64,
    pub quality_score: f64,
    pub quality_passed: bool,
    pub evaluation: EvaluationSummary,
}

/// One event of a streamed answer, serialized as the SSE `data` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Delta { content: String, model: ModelId },
    Done(StreamSummary),
    Error { error: String },
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Delta { .. })
    }
}
