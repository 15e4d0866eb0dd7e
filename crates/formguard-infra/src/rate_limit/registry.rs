//! Named rate limit policies.

use std::collections::HashMap;
use std::time::Duration;

use formguard_core::ConfigError;
use formguard_core::domain::{CONTACT_BUCKET, DEFAULT_BUCKET, RateLimitBucket, SUBSCRIBE_BUCKET};

const MINUTE_MS: u64 = 60 * 1000;

/// Built-in policies: (name, max requests, window ms).
const DEFAULT_POLICY: (&str, u32, u64) = (DEFAULT_BUCKET, 100, MINUTE_MS);
const NAMED_POLICIES: [(&str, u32, u64); 2] =
    [(CONTACT_BUCKET, 60, MINUTE_MS), (SUBSCRIBE_BUCKET, 30, MINUTE_MS)];

/// Maps operation names to buckets. Unknown names resolve to `default`.
#[derive(Debug, Clone)]
pub struct BucketRegistry {
    buckets: HashMap<String, RateLimitBucket>,
    default: RateLimitBucket,
}

impl BucketRegistry {
    pub fn new(default: RateLimitBucket) -> Self {
        Self {
            buckets: HashMap::new(),
            default,
        }
    }

    /// Register (or replace) a bucket under its own name.
    pub fn with_bucket(mut self, bucket: RateLimitBucket) -> Self {
        if bucket.name() == DEFAULT_BUCKET {
            self.default = bucket;
        } else {
            self.buckets.insert(bucket.name().to_string(), bucket);
        }
        self
    }

    /// The built-in contact, subscribe and default policies.
    pub fn standard() -> Result<Self, ConfigError> {
        Self::from_lookup(|_| None)
    }

    /// Standard policies with overrides read through `lookup`:
    /// `RATE_LIMIT_<BUCKET>_MAX_REQUESTS`, `RATE_LIMIT_<BUCKET>_WINDOW_MS`
    /// and the namespace root `RATE_LIMIT_KEY_PREFIX`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup("RATE_LIMIT_KEY_PREFIX").unwrap_or_else(|| "rl".to_string());

        let build = |(name, max_requests, window_ms): (&str, u32, u64)| {
            let upper = name.to_uppercase();
            let max_requests = lookup(&format!("RATE_LIMIT_{upper}_MAX_REQUESTS"))
                .and_then(|s| s.parse().ok())
                .unwrap_or(max_requests);
            let window_ms = lookup(&format!("RATE_LIMIT_{upper}_WINDOW_MS"))
                .and_then(|s| s.parse().ok())
                .unwrap_or(window_ms);

            RateLimitBucket::new(name, max_requests, window_ms, format!("{root}:{name}"))
        };

        let mut registry = Self::new(build(DEFAULT_POLICY)?);
        for policy in NAMED_POLICIES {
            registry = registry.with_bucket(build(policy)?);
        }
        Ok(registry)
    }

    /// Load policies from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Bucket by name, falling back to `default`.
    pub fn get(&self, name: &str) -> &RateLimitBucket {
        self.buckets.get(name).unwrap_or(&self.default)
    }

    /// Shortest configured window, used as the sweep cadence.
    pub fn shortest_window(&self) -> Duration {
        self.iter()
            .map(RateLimitBucket::window)
            .min()
            .unwrap_or_else(|| self.default.window())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateLimitBucket> {
        self.buckets.values().chain(std::iter::once(&self.default))
    }
}
