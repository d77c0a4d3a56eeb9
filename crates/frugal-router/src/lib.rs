// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request classification and model selection.
//!
//! This crate provides:
//! - [`ComplexityClassifier`]: token-volume tiers (simple / medium / complex)
//! - [`IntentClassifier`]: ordered keyword rules over the latest user message
//! - [`select_model`] and [`escalate`]: the pure selection policy and retry ladder
//! - [`ModelRouter`]: all of the above combined into a [`RoutingDecision`]

pub mod classifier;
pub mod router;
pub mod selector;

pub use classifier::{ComplexityClassifier, ComplexityTier, Intent, IntentClassifier};
pub use router::{ModelRouter, RoutingDecision};
pub use selector::{escalate, select_model};
