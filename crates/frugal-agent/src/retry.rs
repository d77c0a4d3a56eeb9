// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quality-gated escalation.
//!
//! After each attempt the verdict decides whether to stop or re-dispatch to
//! the next model in the escalation table. At most one retry is ever made.

use frugal_core::{Evaluation, ModelId};
use frugal_router::escalate;

/// Hard ceiling on extra attempts per request.
pub const MAX_RETRIES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryEscalationPolicy {
    max_retries: u32,
}

impl RetryEscalationPolicy {
    /// `max_retries` is capped at [`MAX_RETRIES`].
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.min(MAX_RETRIES),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Model for the next attempt, or `None` to stop with this attempt's result.
    ///
    /// `attempt` is zero-based. Stops on a passing verdict, on an exhausted
    /// retry budget, or when `current` has no stronger model.
    pub fn next_model(
        &self,
        attempt: u32,
        current: ModelId,
        evaluation: &Evaluation,
    ) -> Option<ModelId> {
        if evaluation.passed || attempt >= self.max_retries {
            return None;
        }
        escalate(current)
    }
}

impl Default for RetryEscalationPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES)
    }
}
