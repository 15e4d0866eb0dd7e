//! # Formguard Infrastructure
//!
//! Concrete implementations of the ports defined in `formguard-core`:
//! sliding window rate limiters, the gateway selecting between them, and
//! delivery adapters for the form endpoints.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external store, in-memory rate limiting only
//! - `redis` - Redis-backed distributed rate limiting

pub mod delivery;
pub mod rate_limit;

// Re-exports - In-Memory
pub use delivery::{BrevoConfig, BrevoNewsletter, LogContactInbox, UnconfiguredNewsletter};
pub use rate_limit::{
    BucketRegistry, GatewayConfig, InMemorySlidingWindowLimiter, RateLimitGateway, RedisConfig,
};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use rate_limit::{RedisSlidingWindowLimiter, RedisWindowStore};
