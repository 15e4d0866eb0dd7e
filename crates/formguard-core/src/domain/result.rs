use serde::Serialize;

pub const HEADER_LIMIT: &str = "X-RateLimit-Limit";
pub const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
pub const HEADER_RESET: &str = "X-RateLimit-Reset";
pub const HEADER_RETRY_AFTER: &str = "Retry-After";

/// Outcome of a single `limit()` call.
///
/// A denied request is a normal outcome (`allowed == false`), not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// The bucket's `max_requests`.
    pub limit: u32,
    /// Requests left in the current window, never above `limit`.
    pub remaining: u32,
    /// Epoch milliseconds at which the window frees up.
    pub reset: u64,
}

impl RateLimitResult {
    /// Result for a request admitted with `used` requests now in the window.
    pub fn admitted(limit: u32, used: u32, reset: u64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining: limit.saturating_sub(used),
            reset,
        }
    }

    pub fn denied(limit: u32, reset: u64) -> Self {
        Self {
            allowed: false,
            limit,
            remaining: 0,
            reset,
        }
    }

    /// Reset time as UNIX seconds, rounded up.
    pub fn reset_secs(&self) -> u64 {
        self.reset.div_ceil(1000)
    }

    /// Whole seconds until the window frees up, at least one.
    pub fn retry_after_secs(&self, now_ms: u64) -> u64 {
        self.reset.saturating_sub(now_ms).div_ceil(1000).max(1)
    }

    /// HTTP headers describing this result.
    ///
    /// `Retry-After` is only present when the request was denied.
    pub fn headers(&self, now_ms: u64) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            (HEADER_LIMIT, self.limit.to_string()),
            (HEADER_REMAINING, self.remaining.to_string()),
            (HEADER_RESET, self.reset_secs().to_string()),
        ];

        if !self.allowed {
            headers.push((HEADER_RETRY_AFTER, self.retry_after_secs(now_ms).to_string()));
        }

        headers
    }
}
