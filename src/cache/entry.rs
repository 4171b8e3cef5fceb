//! Cache Entry Module
//!
//! Defines a single cached upstream document and its expiry window.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

/// Shortest TTL accepted, so that `expires_at` is always after `stored_at`.
const MIN_TTL: Duration = Duration::from_millis(1);

// == Cache Entry ==
/// A cached JSON document with its storage and expiry instants.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Key the entry is stored under
    pub key: String,
    /// The cached document
    pub value: Value,
    /// When the entry was written
    pub stored_at: Instant,
    /// When the entry stops being served
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stored now and expiring after `ttl`.
    pub fn new(key: String, value: Value, ttl: Duration) -> Self {
        Self::stored_at(key, value, ttl, Instant::now())
    }

    /// Creates an entry as if stored at `now`.
    pub fn stored_at(key: String, value: Value, ttl: Duration, now: Instant) -> Self {
        Self {
            key,
            value,
            stored_at: now,
            expires_at: now + ttl.max(MIN_TTL),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is logically absent at `now`.
    ///
    /// Boundary condition: an entry expires the instant `now >= expires_at`,
    /// whether or not it is still physically in the store.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Checks expiry against the current instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
