//! Rate limit gateway - one entry point for handlers, whatever the backend.

use std::sync::Arc;

use formguard_core::ConfigError;
use formguard_core::domain::{ClientIdentifier, FailurePolicy, RateLimitBucket, RateLimitResult};
use formguard_core::ports::{Clock, RateLimiter, SystemClock};

use super::config::failure_policy_from_lookup;
use super::{BucketRegistry, InMemorySlidingWindowLimiter, RedisConfig};

/// Everything needed to build a [`RateLimitGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Shared store; `None` selects the in-memory backend.
    pub redis: Option<RedisConfig>,
    pub failure_policy: FailurePolicy,
    pub buckets: BucketRegistry,
}

impl GatewayConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            redis: RedisConfig::from_lookup(&lookup),
            failure_policy: failure_policy_from_lookup(&lookup),
            buckets: BucketRegistry::from_lookup(&lookup)?,
        })
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Façade over the selected backend and the bucket registry.
///
/// Built once at startup and shared with handlers; the backend never
/// changes for the lifetime of the process.
#[derive(Clone)]
pub struct RateLimitGateway {
    limiter: Arc<dyn RateLimiter>,
    buckets: Arc<BucketRegistry>,
    clock: Arc<dyn Clock>,
}

impl RateLimitGateway {
    pub fn new(
        limiter: Arc<dyn RateLimiter>,
        buckets: BucketRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            limiter,
            buckets: Arc::new(buckets),
            clock,
        }
    }

    /// Gateway over a fresh in-memory backend.
    pub fn in_memory(buckets: BucketRegistry, clock: Arc<dyn Clock>) -> Self {
        let limiter = Arc::new(InMemorySlidingWindowLimiter::with_clock(clock.clone()));
        Self::new(limiter, buckets, clock)
    }

    /// Select the backend: Redis when a store is configured, in-memory
    /// otherwise.
    pub fn from_config(config: GatewayConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        match &config.redis {
            Some(redis) => Self::with_redis(redis, config.failure_policy, config.buckets, clock),
            None => {
                tracing::warn!(
                    "No rate limit store configured - using per-process in-memory limiter"
                );
                Self::in_memory(config.buckets, clock)
            }
        }
    }

    #[cfg(feature = "redis")]
    fn with_redis(
        redis: &RedisConfig,
        policy: FailurePolicy,
        buckets: BucketRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        match super::RedisSlidingWindowLimiter::new(redis, policy) {
            Ok(limiter) => Self::new(Arc::new(limiter), buckets, clock),
            Err(e) => {
                // An unusable URL is a deployment error; the policy decides.
                tracing::error!(error = %e, policy = policy.as_str(), "Invalid rate limit store URL");
                Self::new(Arc::new(PolicyOnlyLimiter { policy, clock: clock.clone() }), buckets, clock)
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    fn with_redis(
        _redis: &RedisConfig,
        _policy: FailurePolicy,
        buckets: BucketRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        tracing::warn!("Store configured but the redis feature is disabled - using in-memory limiter");
        Self::in_memory(buckets, clock)
    }

    /// Apply the named bucket to `identifier`.
    pub async fn limit(&self, bucket_name: &str, identifier: &ClientIdentifier) -> RateLimitResult {
        let bucket = self.buckets.get(bucket_name);
        self.limiter.limit(bucket, identifier).await
    }

    /// Rate limit headers for a result produced by this gateway.
    pub fn headers(&self, result: &RateLimitResult) -> Vec<(&'static str, String)> {
        result.headers(self.clock.now_ms())
    }

    /// Seconds a denied client should wait.
    pub fn retry_after_secs(&self, result: &RateLimitResult) -> u64 {
        result.retry_after_secs(self.clock.now_ms())
    }

    pub fn bucket(&self, name: &str) -> &RateLimitBucket {
        self.buckets.get(name)
    }

    pub fn buckets(&self) -> &BucketRegistry {
        &self.buckets
    }

    /// Drop idle in-memory windows; a no-op for the shared store.
    pub fn sweep(&self) -> usize {
        self.limiter.sweep()
    }

    pub fn backend_name(&self) -> &'static str {
        self.limiter.name()
    }
}

/// Stand-in used when a configured store cannot even be addressed:
/// every call resolves through the failure policy.
#[cfg(feature = "redis")]
struct PolicyOnlyLimiter {
    policy: FailurePolicy,
    clock: Arc<dyn Clock>,
}

#[cfg(feature = "redis")]
#[async_trait::async_trait]
impl RateLimiter for PolicyOnlyLimiter {
    async fn limit(
        &self,
        bucket: &RateLimitBucket,
        _identifier: &ClientIdentifier,
    ) -> RateLimitResult {
        self.policy.fallback(bucket, self.clock.now_ms())
    }

    fn name(&self) -> &'static str {
        "redis-unavailable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use formguard_core::domain::{
        CONTACT_BUCKET, HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET, HEADER_RETRY_AFTER,
    };
    use formguard_core::ports::ManualClock;

    const START: u64 = 1_700_000_000_000;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn gateway(max: &str) -> (Arc<ManualClock>, RateLimitGateway) {
        let buckets = BucketRegistry::from_lookup(lookup(&[
            ("RATE_LIMIT_CONTACT_MAX_REQUESTS", max),
            ("RATE_LIMIT_CONTACT_WINDOW_MS", "1000"),
        ]))
        .unwrap();
        let clock = Arc::new(ManualClock::new(START));
        (clock.clone(), RateLimitGateway::in_memory(buckets, clock))
    }

    fn header<'a>(headers: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_selects_memory_without_store() {
        let config = GatewayConfig::from_lookup(lookup(&[("REDIS_URL", "redis://x")])).unwrap();
        assert!(config.redis.is_none());
        assert_eq!(RateLimitGateway::from_config(config).backend_name(), "memory");
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_selects_redis_with_url_and_token() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("REDIS_URL", "redis://localhost:6379"),
            ("REDIS_TOKEN", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::FailClosed);
        assert_eq!(RateLimitGateway::from_config(config).backend_name(), "redis");
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_unparseable_store_url_applies_policy() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("REDIS_URL", "not a url"),
            ("REDIS_TOKEN", "secret"),
            ("RATE_LIMIT_FAILURE_POLICY", "open"),
        ]))
        .unwrap();
        let gateway = RateLimitGateway::from_config(config);
        let res = gateway
            .limit(CONTACT_BUCKET, &ClientIdentifier::sanitize("1.2.3.4"))
            .await;
        assert!(res.allowed);
        assert_eq!(res.remaining, 59);
    }

    #[tokio::test]
    async fn test_headers_follow_result() {
        let (clock, gateway) = gateway("3");
        let id = ClientIdentifier::sanitize("1.2.3.4");

        for expected in ["2", "1", "0"] {
            let res = gateway.limit(CONTACT_BUCKET, &id).await;
            let headers = gateway.headers(&res);
            assert_eq!(header(&headers, HEADER_REMAINING), Some(expected));
            assert_eq!(header(&headers, HEADER_REMAINING), Some(res.remaining.to_string().as_str()));
            assert_eq!(header(&headers, HEADER_LIMIT), Some("3"));
            assert!(header(&headers, HEADER_RETRY_AFTER).is_none());
        }

        clock.advance(250);
        let denied = gateway.limit(CONTACT_BUCKET, &id).await;
        assert!(!denied.allowed);
        let headers = gateway.headers(&denied);
        assert_eq!(header(&headers, HEADER_RETRY_AFTER), Some("1"));
        assert_eq!(header(&headers, HEADER_RESET), Some(((START + 1000) / 1000).to_string().as_str()));
        assert_eq!(gateway.retry_after_secs(&denied), 1);
    }

    #[tokio::test]
    async fn test_unknown_bucket_uses_default() {
        let (_clock, gateway) = gateway("1");
        let res = gateway
            .limit("vitals", &ClientIdentifier::sanitize("1.2.3.4"))
            .await;
        assert_eq!(res.limit, 100);
        assert_eq!(res.remaining, 99);
    }

    #[tokio::test]
    async fn test_sweep_delegates_to_backend() {
        let (clock, gateway) = gateway("3");
        gateway
            .limit(CONTACT_BUCKET, &ClientIdentifier::sanitize("1.2.3.4"))
            .await;
        clock.advance(1001);
        assert_eq!(gateway.sweep(), 1);
    }
}
