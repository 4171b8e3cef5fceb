//! Cache Statistics Module
//!
//! Tracks cache hits, misses and evictions for the health endpoint.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of entries currently stored
    pub size: usize,
    /// Configured maximum number of entries
    pub capacity: usize,
    /// Lookups that returned a live entry
    pub hit_count: u64,
    /// Lookups that found nothing or an expired entry
    pub miss_count: u64,
    /// Entries dropped to make room for new keys
    pub evictions: u64,
    /// hit_count / (hit_count + miss_count)
    pub hit_rate: f64,
}

// == Counters ==
/// Running counters owned by the store.
#[derive(Debug, Clone, Default)]
pub struct CacheCounters {
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Builds a snapshot for a store of the given size and capacity.
    pub fn snapshot(&self, size: usize, capacity: usize) -> CacheStats {
        CacheStats {
            size,
            capacity,
            hit_count: self.hits,
            miss_count: self.misses,
            evictions: self.evictions,
            hit_rate: self.hit_rate(),
        }
    }
}
