// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token count estimation.
//!
//! Uses the `cl100k_base` BPE when it can be loaded and falls back to a
//! word-count heuristic otherwise. Estimation never fails.

use std::sync::Arc;

use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Multiplier applied to the whitespace word count by the fallback path.
const TOKENS_PER_WORD: f64 = 1.3;

/// Approximates the token count of arbitrary text.
#[derive(Clone)]
pub struct TokenEstimator {
    bpe: Option<Arc<CoreBPE>>,
}

impl std::fmt::Debug for TokenEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEstimator")
            .field("tokenizer", &if self.bpe.is_some() { "cl100k_base" } else { "word-heuristic" })
            .finish()
    }
}

impl TokenEstimator {
    /// Loads the reference tokenizer, degrading to the heuristic on failure.
    pub fn new() -> Self {
        match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Self {
                bpe: Some(Arc::new(bpe)),
            },
            Err(e) => {
                warn!(error = %e, "tokenizer unavailable, using word-count estimate");
                Self::word_heuristic()
            }
        }
    }

    /// An estimator that only uses the word-count heuristic.
    pub fn word_heuristic() -> Self {
        Self { bpe: None }
    }

    /// Estimated token count of `text`. Empty text is zero tokens.
    pub fn count(&self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        match &self.bpe {
            Some(bpe) => u32::try_from(bpe.encode_with_special_tokens(text).len()).unwrap_or(u32::MAX),
            None => word_estimate(text),
        }
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// `ceil(words * 1.3)`.
pub fn word_estimate(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    (words as f64 * TOKENS_PER_WORD).ceil() as u32
}
