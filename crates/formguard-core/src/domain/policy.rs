use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{RateLimitBucket, RateLimitResult};
use crate::error::ConfigError;

/// What a backend answers when its store cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Admit the request.
    FailOpen,
    /// Deny the request.
    #[default]
    FailClosed,
}

impl FailurePolicy {
    /// The result to return instead of a store answer.
    pub fn fallback(self, bucket: &RateLimitBucket, now_ms: u64) -> RateLimitResult {
        let reset = now_ms + bucket.window_ms();
        match self {
            FailurePolicy::FailOpen => RateLimitResult::admitted(bucket.max_requests(), 1, reset),
            FailurePolicy::FailClosed => RateLimitResult::denied(bucket.max_requests(), reset),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::FailOpen => "open",
            FailurePolicy::FailClosed => "closed",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "fail_open" | "fail-open" => Ok(FailurePolicy::FailOpen),
            "closed" | "fail_closed" | "fail-closed" => Ok(FailurePolicy::FailClosed),
            other => Err(ConfigError::InvalidValue {
                key: "RATE_LIMIT_FAILURE_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_results() {
        let bucket = RateLimitBucket::new("contact", 5, 1000, "rl:contact").unwrap();

        let open = FailurePolicy::FailOpen.fallback(&bucket, 10_000);
        assert!(open.allowed);
        assert_eq!(open.remaining, 4);
        assert_eq!(open.reset, 11_000);

        let closed = FailurePolicy::FailClosed.fallback(&bucket, 10_000);
        assert!(!closed.allowed);
        assert_eq!(closed.remaining, 0);
        assert_eq!(closed.reset, 11_000);
    }

    #[test]
    fn test_parse() {
        assert_eq!("open".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailOpen);
        assert_eq!(
            " Fail-Closed ".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::FailClosed
        );
        assert!("production".parse::<FailurePolicy>().is_err());
    }
}
