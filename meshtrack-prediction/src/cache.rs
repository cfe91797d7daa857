//! Latest prediction per peer.
//!
//! Uses `moka::sync::Cache` with a wall-clock TTL for memory bounds, plus a
//! logical freshness check against the caller's `now`. Invalidated on new
//! samples, model switches, and config changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;

use crate::engine::PredictionOutput;

pub struct PredictionCache {
    cache: Cache<String, Arc<PredictionOutput>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PredictionCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self {
            cache,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached output for `peer_id`, if it was made no more than one TTL
    /// before `now` and not after it.
    pub fn get(&self, peer_id: &str, now: DateTime<Utc>) -> Option<Arc<PredictionOutput>> {
        let fresh = self.cache.get(peer_id).filter(|output| {
            let age = now - output.prediction.made_at;
            age >= chrono::Duration::zero()
                && age.to_std().map_or(false, |age| age <= self.ttl)
        });
        match fresh {
            Some(output) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(output)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, peer_id: String, output: Arc<PredictionOutput>) {
        self.cache.insert(peer_id, output);
    }

    pub fn invalidate(&self, peer_id: &str) {
        self.cache.invalidate(peer_id);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Cache hit rate (0.0–1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = (self.hits() + self.misses()) as f64;
        if total == 0.0 {
            0.0
        } else {
            self.hits() as f64 / total
        }
    }

    /// Approximate; moka applies writes lazily.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
