//! Cache Store Module
//!
//! Bounded map of upstream documents with TTL expiry and FIFO eviction.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::cache::{CacheCounters, CacheEntry, CacheStats, InsertionOrder};

// == Cache Store ==
/// In-memory cache of JSON documents.
///
/// Size never exceeds `capacity`. When a new key arrives at capacity the
/// oldest-inserted entry is evicted; reads do not affect eviction order.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    order: InsertionOrder,
    counters: CacheCounters,
    capacity: usize,
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries (at least 1)
    /// * `default_ttl` - TTL used when `set` is called without one
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            counters: CacheCounters::new(),
            capacity: capacity.max(1),
            default_ttl,
        }
    }

    // == Get ==
    /// Returns a live value for `key`.
    ///
    /// An expired entry is removed and reported as absent. Every call counts
    /// as either a hit or a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = Instant::now();

        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                let value = entry.value.clone();
                self.counters.record_hit();
                Some(value)
            }
            Some(_) => {
                self.remove(key);
                self.counters.record_miss();
                None
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl` (or the default TTL).
    ///
    /// Overwriting keeps the key's eviction slot. Inserting a new key at
    /// capacity evicts exactly one entry, the oldest inserted.
    pub fn set(&mut self, key: String, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_oldest() {
                self.entries.remove(&evicted);
                self.counters.record_eviction();
            }
        }

        let entry = CacheEntry::new(key.clone(), value, ttl);
        self.order.record(&key);
        self.entries.insert(key, entry);
    }

    // == Sweep ==
    /// Removes every entry with `expires_at <= now`.
    ///
    /// Idempotent and cheap on an empty store. Returns the number removed.
    pub fn sweep(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }

        expired.len()
    }

    // == Clear ==
    /// Empties the store and returns how many entries were dropped.
    ///
    /// Counters are kept so hit/miss history survives a manual flush.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.order.clear();
        count
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len(), self.capacity)
    }

    /// Physical number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Whether `key` is physically stored, expired or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.remove(key);
    }
}
