//! Request Governor
//!
//! Per-client request limiting applied ahead of every news route. Cache
//! hits and misses both count against the limit.

mod window;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::warn;

pub use window::{RateLimitWindow, WindowState};

// == Admission ==
/// Outcome of asking the governor to admit one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

// == Governor Settings ==
/// Limit configuration, reported by the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernorSettings {
    pub window_ms: u64,
    pub max_requests: u32,
}

// == Request Governor ==
/// Cloneable handle to the shared per-client windows.
#[derive(Debug, Clone)]
pub struct RequestGovernor {
    windows: Arc<Mutex<HashMap<String, RateLimitWindow>>>,
    window: Duration,
    max_requests: u32,
}

impl RequestGovernor {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    // == Admit ==
    /// Counts one request from `client_id`.
    ///
    /// The window resets once `now - window_start >= window`. Exactly
    /// `max_requests` are admitted per window; later ones are denied with
    /// the time left until reset.
    pub fn admit(&self, client_id: &str) -> Admission {
        let now = Instant::now();
        let mut windows = self.lock();

        let entry = windows
            .entry(client_id.to_string())
            .or_insert_with(|| RateLimitWindow::fresh(now));

        if entry.state(now, self.window) == WindowState::Expired {
            *entry = RateLimitWindow::fresh(now);
        }

        if entry.count >= self.max_requests {
            return Admission::Denied {
                retry_after: entry.retry_after(now, self.window),
            };
        }

        entry.count += 1;
        Admission::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    // == Prune ==
    /// Drops windows that have expired. Returns the number removed.
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, w| w.state(now, self.window) != WindowState::Expired);
        before - windows.len()
    }

    pub fn settings(&self) -> GovernorSettings {
        GovernorSettings {
            window_ms: self.window.as_millis() as u64,
            max_requests: self.max_requests,
        }
    }

    /// Number of clients with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitWindow>> {
        match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Rate-limit lock poisoned, resetting all windows");
                let mut guard = poisoned.into_inner();
                guard.clear();
                self.windows.clear_poison();
                guard
            }
        }
    }
}
