// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic request classification.
//!
//! Two independent, zero-cost classifiers: complexity from estimated token
//! volume, and intent from an ordered keyword rule list. No LLM pre-call,
//! no network, no latency.

use frugal_core::{ChatMessage, TokenEstimator, last_user_message};
use serde::Serialize;
use strum::Display;

/// Token-volume tiers used when intent gives no strong signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComplexityTier {
    Simple,
    Medium,
    Complex,
}

/// Totals below this are `Simple`.
pub const MEDIUM_THRESHOLD: u32 = 500;

/// Totals at or above this are `Complex`.
pub const COMPLEX_THRESHOLD: u32 = 2000;

/// Buckets a request by `estimated input tokens + max_tokens`.
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    estimator: TokenEstimator,
}

impl ComplexityClassifier {
    pub fn new(estimator: TokenEstimator) -> Self {
        Self { estimator }
    }

    /// Estimated input tokens over every message, joined by single spaces.
    pub fn input_tokens(&self, messages: &[ChatMessage]) -> u32 {
        let text = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        self.estimator.count(&text)
    }

    pub fn classify(&self, messages: &[ChatMessage], max_tokens: u32) -> ComplexityTier {
        tier_for_total(self.input_tokens(messages).saturating_add(max_tokens))
    }
}

/// Maps a token total onto a tier. `< 500` simple, `< 2000` medium.
pub fn tier_for_total(total: u32) -> ComplexityTier {
    if total < MEDIUM_THRESHOLD {
        ComplexityTier::Simple
    } else if total < COMPLEX_THRESHOLD {
        ComplexityTier::Medium
    } else {
        ComplexityTier::Complex
    }
}

/// Coarse task category used to bias model choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Intent {
    Coding,
    Math,
    Creative,
    Analysis,
    Translation,
    SimpleQa,
    General,
}

const CODING: &[&str] = &[
    "code", "function", "program", "debug", "script", "algorithm", "class", "method",
    "variable", "api", "bug", "error", "compile", "syntax", "import", "package", "library",
    "framework", "database", "sql", "query", "regex", "javascript", "python", "java", "react",
    "node", "git", "terminal", "command", "cli", "implement", "refactor",
];

const MATH: &[&str] = &[
    "calculate", "math", "equation", "solve", "formula", "sum", "average", "percentage",
    "statistics", "probability", "algebra", "geometry", "theorem", "proof", "number", "count",
    "total",
];

const CREATIVE: &[&str] = &[
    "write a story", "write a poem", "creative", "narrative", "fiction", "character", "plot",
    "dialogue", "screenplay", "novel", "poetry", "haiku", "limerick", "song lyrics",
    "imaginative",
];

const ANALYSIS: &[&str] = &[
    "analyze", "research", "compare", "evaluate", "assess", "review", "critique", "examine",
    "investigate", "study", "pros and cons", "advantages", "disadvantages",
    "difference between",
];

const TRANSLATION: &[&str] = &[
    "translate", "translation", "language", "spanish", "french", "german", "chinese",
    "japanese", "korean", "arabic", "portuguese",
];

const SIMPLE_QA: &[&str] = &[
    "what is", "who is", "when did", "where is", "define", "definition", "meaning of",
    "explain briefly", "quick question", "simple question",
];

/// Rules evaluated top to bottom; the first rule with any substring hit wins.
///
/// Categories overlap on purpose ("query" is coding, "number" is math), so
/// this order is part of the classification contract.
pub const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::Coding, CODING),
    (Intent::Math, MATH),
    (Intent::Creative, CREATIVE),
    (Intent::Analysis, ANALYSIS),
    (Intent::Translation, TRANSLATION),
    (Intent::SimpleQa, SIMPLE_QA),
];

/// Classifies the latest user message against [`INTENT_RULES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// `General` when there is no user message or no rule matches.
    pub fn classify(&self, messages: &[ChatMessage]) -> Intent {
        match last_user_message(messages) {
            Some(text) => classify_text(text),
            None => Intent::General,
        }
    }
}

/// Case-insensitive substring match against the ordered rule list.
pub fn classify_text(text: &str) -> Intent {
    let lower = text.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}
