//! Inbound rate limiting.

use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::debug;

use crate::Result;
use crate::config::RateLimit;
use crate::time::{Clock, SystemClock};

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    /// Accepted; this many more messages fit in the current window.
    Remaining(u32),
    /// Rejected; the window is full.
    Denied,
}

/// Counts inbound messages per key.
pub trait RateLimiter: Send + Sync {
    /// Records one message for `key` and reports whether it fits in `limit`.
    fn check(&self, key: &str, limit: &RateLimit) -> impl Future<Output = Result<Quota>> + Send;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter held in memory.
///
/// A key's window starts with its first message and resets once
/// `window_secs` have passed. Denied messages are not counted.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter<C = SystemClock> {
    clock: C,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    /// Creates a limiter on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> FixedWindowLimiter<C> {
    /// Creates a limiter on the given clock.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl<C: Clock> RateLimiter for FixedWindowLimiter<C> {
    async fn check(&self, key: &str, limit: &RateLimit) -> Result<Quota> {
        let now = self.clock.now();
        let mut windows = self.windows.lock().await;
        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if self.clock.has_elapsed(window.started, limit.window()) {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= limit.max_messages {
            debug!(key, count = window.count, "rate limit window full");
            return Ok(Quota::Denied);
        }

        window.count += 1;
        Ok(Quota::Remaining(limit.max_messages - window.count))
    }
}
