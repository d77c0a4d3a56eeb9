// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model registry and cost estimation for the Frugal completion router.
//!
//! This crate provides:
//! - **Registry**: the immutable model id → backend and price table
//! - **Calculator**: per-call cost, summed multi-attempt cost, and savings
//!   against the top-quality reference model

pub mod calculator;
pub mod pricing;

pub use calculator::{CostBreakdown, CostCalculator, REFERENCE_MODEL, round_usd};
pub use pricing::{ModelProfile, ModelRegistry};
