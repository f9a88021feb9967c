//! Fixed-window admission control keyed by client identity.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::clock::Clock;
use crate::error::AppError;

pub const DEFAULT_MAX_REQUESTS: u32 = 10;
pub const DEFAULT_WINDOW_SECONDS: i64 = 60;

/// Request count within the current window for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindowState {
    pub request_count: u32,
    pub window_start: DateTime<Utc>,
}

/// Per-identity fixed-window rate limiter.
///
/// A window opens on the first request from an identity and admits at most
/// `max_requests` requests. The first request arriving more than `window`
/// after the window opened starts a fresh one.
///
/// The check and the update happen while the identity's map entry is locked,
/// so concurrent requests from one identity can never be admitted past the
/// limit. Entries idle for more than twice the window are swept out during
/// admission checks, at most once per window.
pub struct RateLimiter {
    entries: DashMap<String, RateWindowState>,
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    last_sweep_ms: AtomicI64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let last_sweep_ms = AtomicI64::new(clock.now().timestamp_millis());
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
            clock,
            last_sweep_ms,
        }
    }

    /// Admits or rejects one request from `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RateLimitExceeded`] when the identity has used up
    /// its window.
    pub fn check(&self, identity: &str) -> Result<(), AppError> {
        let now = self.clock.now();

        // Must run before the entry lock below is taken; `retain` locks every shard.
        self.maybe_sweep(now);

        let mut state = self
            .entries
            .entry(identity.to_string())
            .or_insert(RateWindowState {
                request_count: 0,
                window_start: now,
            });

        if now - state.window_start > self.window {
            state.request_count = 0;
            state.window_start = now;
        }

        if state.request_count >= self.max_requests {
            return Err(AppError::RateLimitExceeded);
        }

        state.request_count += 1;
        Ok(())
    }

    /// Current window state for `identity`, if tracked.
    pub fn state_of(&self, identity: &str) -> Option<RateWindowState> {
        self.entries.get(identity).map(|s| *s)
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.entries.len()
    }

    fn maybe_sweep(&self, now: DateTime<Utc>) {
        let now_ms = now.timestamp_millis();
        let last = self.last_sweep_ms.load(Ordering::Relaxed);

        if now_ms - last < self.window.num_milliseconds() {
            return;
        }

        if self
            .last_sweep_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let max_idle = self.window * 2;
        let before = self.entries.len();
        self.entries
            .retain(|_, state| now - state.window_start <= max_idle);

        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept idle rate-limit entries");
        }
    }
}
