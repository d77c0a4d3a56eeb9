// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost estimation from token counts.
//!
//! Figures are estimates for reporting, not billing.

use frugal_core::{ModelId, TokenUsage};
use serde::Serialize;

use crate::pricing::ModelRegistry;

/// Savings are measured against the top-quality model on the same tokens.
pub const REFERENCE_MODEL: ModelId = ModelId::Claude35Sonnet;

/// Cost of one or more provider calls, plus what the reference model would have cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub cost: f64,
    pub reference_cost: f64,
}

impl CostBreakdown {
    /// `max(0, reference - actual)`.
    pub fn savings(&self) -> f64 {
        (self.reference_cost - self.cost).max(0.0)
    }

    /// Adds another attempt's cost. Totals are sums over all attempts.
    pub fn accumulate(&mut self, other: CostBreakdown) {
        self.cost += other.cost;
        self.reference_cost += other.reference_cost;
    }
}

/// Derives estimated cost from token counts and the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostCalculator {
    registry: ModelRegistry,
}

impl CostCalculator {
    pub fn new(registry: ModelRegistry) -> Self {
        Self { registry }
    }

    /// USD cost of `usage` on `model`.
    pub fn cost(&self, model: ModelId, usage: &TokenUsage) -> f64 {
        let profile = self.registry.profile(model);
        (f64::from(usage.input_tokens) / 1000.0) * profile.input_per_k
            + (f64::from(usage.output_tokens) / 1000.0) * profile.output_per_k
    }

    pub fn breakdown(&self, model: ModelId, usage: &TokenUsage) -> CostBreakdown {
        CostBreakdown {
            cost: self.cost(model, usage),
            reference_cost: self.cost(REFERENCE_MODEL, usage),
        }
    }
}

/// Rounds a USD figure to six decimal places for reporting.
pub fn round_usd(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
