//! Cache Module
//!
//! Bounded in-memory cache for upstream news documents, with TTL expiry,
//! FIFO eviction and deterministic key derivation.

mod entry;
mod fifo;
mod key;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use fifo::InsertionOrder;
pub use key::{build_key, Namespace, LONG_TTL, SHORT_TTL};
pub use shared::SharedCache;
pub use stats::{CacheCounters, CacheStats};
pub use store::CacheStore;
