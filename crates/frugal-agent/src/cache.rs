// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-addressed cache of complete non-streaming answers.
//!
//! Keys are SHA-256 digests over the cost-relevant part of a request.
//! Entries expire after a fixed TTL; lookups treat expired entries as misses
//! and a background sweep reclaims them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use frugal_core::{ChatMessage, RequestSpec};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::record::CompletionRecord;

#[derive(Serialize)]
struct KeyMaterial<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
    prefer_cost: bool,
}

/// Deterministic hex digest of `{messages, max_tokens, temperature, prefer_cost}`.
///
/// `stream` is excluded; streaming requests never touch the cache.
pub fn cache_key(spec: &RequestSpec) -> String {
    let material = KeyMaterial {
        messages: &spec.messages,
        max_tokens: spec.max_tokens,
        temperature: spec.temperature,
        prefer_cost: spec.prefer_cost,
    };
    // Serializing borrowed strings, integers, and finite floats cannot fail.
    let bytes = serde_json::to_vec(&material).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

#[derive(Debug, Clone)]
struct CacheEntry {
    record: CompletionRecord,
    inserted_at: Instant,
}

/// Counters reported by `GET /cache-stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Percentage with two decimals, e.g. `"66.67%"`.
    pub hit_rate: String,
    pub entries: usize,
    pub ttl_secs: u64,
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored record if present and fresh, counting a hit or miss.
    pub fn get(&self, key: &str) -> Option<CompletionRecord> {
        let fresh = self.entries.get(key).and_then(|entry| {
            (entry.inserted_at.elapsed() < self.ttl).then(|| entry.record.clone())
        });

        match fresh {
            Some(record) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(record)
            }
            None => {
                self.entries
                    .remove_if(key, |_, entry| entry.inserted_at.elapsed() >= self.ttl);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores `record`, replacing any previous entry for `key`.
    pub fn insert(&self, key: String, record: CompletionRecord) {
        self.entries.insert(
            key,
            CacheEntry {
                record,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Removes expired entries, returning how many were dropped.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let rate = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64 * 100.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate: format!("{rate:.2}%"),
            entries: self.entries.len(),
            ttl_secs: self.ttl.as_secs(),
        }
    }

    /// Spawns the periodic expiry sweep. It stops when `cancel` fires.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        every: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.sweep();
                        if removed > 0 {
                            debug!(removed, remaining = self.len(), "cache sweep");
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("cache sweeper stopped");
                        break;
                    }
                }
            }
        })
    }
}
