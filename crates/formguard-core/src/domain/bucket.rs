use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bucket used for contact-form submissions.
pub const CONTACT_BUCKET: &str = "contact";
/// Bucket used for newsletter subscriptions.
pub const SUBSCRIBE_BUCKET: &str = "subscribe";
/// Bucket used when no specific policy applies.
pub const DEFAULT_BUCKET: &str = "default";

/// A named rate limit policy: at most `max_requests` per sliding `window_ms`.
///
/// Buckets are validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitBucket {
    name: String,
    max_requests: u32,
    window_ms: u64,
    key_prefix: String,
}

impl RateLimitBucket {
    /// Create a bucket, rejecting zero limits or windows.
    pub fn new(
        name: impl Into<String>,
        max_requests: u32,
        window_ms: u64,
        key_prefix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();

        if max_requests == 0 {
            return Err(ConfigError::InvalidBucket {
                name,
                reason: "max_requests must be greater than zero".to_string(),
            });
        }
        if window_ms == 0 {
            return Err(ConfigError::InvalidBucket {
                name,
                reason: "window_ms must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            name,
            max_requests,
            window_ms,
            key_prefix: key_prefix.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Storage key for an identifier, namespaced by this bucket's prefix.
    pub fn storage_key(&self, identifier: &str) -> String {
        format!("{}:{}", self.key_prefix, identifier)
    }

    /// Window length in whole seconds, rounded up. Used as the store TTL.
    pub fn window_secs_ceil(&self) -> u64 {
        self.window_ms.div_ceil(1000)
    }
}
