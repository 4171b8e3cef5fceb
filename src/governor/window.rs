//! Rate-Limit Window
//!
//! Per-client request counter over a fixed-length window.

use std::time::Duration;

use tokio::time::Instant;

// == Window State ==
/// Lifecycle of a client's window at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No request counted yet
    Fresh,
    /// Inside the window with `count` requests admitted
    Counting,
    /// Window elapsed; the next request starts a fresh one
    Expired,
}

// == Rate Limit Window ==
#[derive(Debug, Clone)]
pub struct RateLimitWindow {
    pub window_start: Instant,
    pub count: u32,
}

impl RateLimitWindow {
    /// Starts an empty window at `now`.
    pub fn fresh(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    pub fn state(&self, now: Instant, length: Duration) -> WindowState {
        if now.saturating_duration_since(self.window_start) >= length {
            WindowState::Expired
        } else if self.count == 0 {
            WindowState::Fresh
        } else {
            WindowState::Counting
        }
    }

    /// Time left until the window resets, never less than one second.
    pub fn retry_after(&self, now: Instant, length: Duration) -> Duration {
        let reset_at = self.window_start + length;
        reset_at
            .saturating_duration_since(now)
            .max(Duration::from_secs(1))
    }
}
