//! Rate limiting ports.

use async_trait::async_trait;

use crate::domain::{ClientIdentifier, RateLimitBucket, RateLimitResult};

/// Rate limiter trait - abstraction over rate limiting backends.
///
/// Implementations never fail: store outages are resolved by the backend's
/// failure policy and an exhausted quota is `allowed == false`.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record a request for `identifier` under `bucket` and decide on it.
    async fn limit(&self, bucket: &RateLimitBucket, identifier: &ClientIdentifier)
    -> RateLimitResult;

    /// Drop state for identifiers whose window has fully expired.
    /// Returns the number of entries removed.
    fn sweep(&self) -> usize {
        0
    }

    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;
}

/// Atomic sliding-window primitive offered by a shared store.
#[async_trait]
pub trait SlidingWindowStore: Send + Sync {
    /// In one atomic step: drop members of `key` scored below
    /// `now_ms - window_ms`, count the rest, and add `member` scored `now_ms`
    /// if that count is below `max_requests`. The key's TTL is refreshed to
    /// `ttl_secs`.
    ///
    /// Returns the count observed before the add.
    async fn record(
        &self,
        key: &str,
        member: &str,
        now_ms: u64,
        window_ms: u64,
        max_requests: u32,
        ttl_secs: u64,
    ) -> Result<u64, RateLimitError>;
}

/// Rate limit store errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store operation timed out after {0} ms")]
    Timeout(u64),

    #[error("Malformed store response: {0}")]
    MalformedResponse(String),
}
