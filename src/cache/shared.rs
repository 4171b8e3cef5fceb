//! Shared Cache Handle
//!
//! Thread-safe handle to a `CacheStore` owned by the application state.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::cache::{CacheStats, CacheStore};

// == Shared Cache ==
/// Cloneable handle around one store instance.
///
/// Every operation takes the lock for a single read-modify-write and never
/// across an `.await`. If a previous holder panicked, the store is rebuilt
/// empty with the same capacity and TTL instead of failing the request.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<CacheStore>>,
    capacity: usize,
    default_ttl: Duration,
}

impl SharedCache {
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheStore::new(capacity, default_ttl))),
            capacity,
            default_ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key)
    }

    pub fn set(&self, key: String, value: Value, ttl: Option<Duration>) {
        self.lock().set(key, value, ttl);
    }

    pub fn sweep(&self) -> usize {
        self.lock().sweep()
    }

    pub fn clear(&self) -> usize {
        self.lock().clear()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Cache lock poisoned, rebuilding an empty store");
                let mut guard = poisoned.into_inner();
                *guard = CacheStore::new(self.capacity, self.default_ttl);
                self.inner.clear_poison();
                guard
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clones_share_one_store() {
        let cache = SharedCache::new(10, Duration::from_secs(60));
        let other = cache.clone();

        cache.set("k".to_string(), json!(1), None);

        assert_eq!(other.get("k"), Some(json!(1)));
        assert_eq!(other.stats().size, 1);
    }

    #[test]
    fn test_poisoned_store_is_rebuilt_empty() {
        let cache = SharedCache::new(10, Duration::from_secs(60));
        cache.set("k".to_string(), json!(1), None);

        let inner = cache.inner.clone();
        let _ = std::thread::spawn(move || {
            let _guard = inner.lock().unwrap();
            panic!("poison the cache lock");
        })
        .join();

        assert_eq!(cache.clear(), 0);
        assert_eq!(cache.stats().size, 0);
        assert_eq!(cache.stats().capacity, 10);

        cache.set("k2".to_string(), json!(2), None);
        assert_eq!(cache.get("k2"), Some(json!(2)));
    }
}
