//! In-memory sliding window rate limiter.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use formguard_core::domain::{ClientIdentifier, RateLimitBucket, RateLimitResult};
use formguard_core::ports::{Clock, RateLimiter, SystemClock};

struct WindowEntry {
    window_ms: u64,
    /// Request timestamps in epoch ms, oldest first.
    timestamps: VecDeque<u64>,
}

/// In-memory sliding window limiter keyed by `<bucket prefix>:<identifier>`.
///
/// This is the fallback when no shared store is configured.
/// Note: Limits are per-process, not distributed across instances.
pub struct InMemorySlidingWindowLimiter {
    windows: DashMap<String, WindowEntry>,
    clock: Arc<dyn Clock>,
}

impl InMemorySlidingWindowLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            clock,
        }
    }

    /// Decide on a request observed at `now_ms`.
    pub fn check_at(
        &self,
        bucket: &RateLimitBucket,
        identifier: &ClientIdentifier,
        now_ms: u64,
    ) -> RateLimitResult {
        let window_start = now_ms.saturating_sub(bucket.window_ms());
        let max = bucket.max_requests();

        // The entry guard holds the shard lock for the whole prune-count-append.
        let mut entry = self
            .windows
            .entry(bucket.storage_key(identifier.as_str()))
            .or_insert_with(|| WindowEntry {
                window_ms: bucket.window_ms(),
                timestamps: VecDeque::new(),
            });
        let window = entry.value_mut();
        window.window_ms = bucket.window_ms();

        while window.timestamps.front().is_some_and(|t| *t < window_start) {
            window.timestamps.pop_front();
        }

        let in_window = window.timestamps.len();
        let allowed = in_window < max as usize;
        if allowed {
            window.timestamps.push_back(now_ms);
        }

        let reset = window
            .timestamps
            .front()
            .map(|oldest| oldest + bucket.window_ms())
            .unwrap_or(now_ms + bucket.window_ms());

        if allowed {
            RateLimitResult::admitted(max, in_window as u32 + 1, reset)
        } else {
            tracing::warn!(
                identifier = %identifier,
                bucket = bucket.name(),
                "In-memory rate limit exceeded"
            );
            RateLimitResult::denied(max, reset)
        }
    }

    /// Remove identifiers whose newest request is older than their window.
    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window
                .timestamps
                .back()
                .is_some_and(|newest| *newest >= now_ms.saturating_sub(window.window_ms))
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked identifiers across all buckets.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

impl Default for InMemorySlidingWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimiter for InMemorySlidingWindowLimiter {
    async fn limit(
        &self,
        bucket: &RateLimitBucket,
        identifier: &ClientIdentifier,
    ) -> RateLimitResult {
        self.check_at(bucket, identifier, self.clock.now_ms())
    }

    fn sweep(&self) -> usize {
        let removed = self.sweep_at(self.clock.now_ms());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.tracked(), "Swept idle rate limit windows");
        }
        removed
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
