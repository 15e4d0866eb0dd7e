//! Rate limiting implementations.

mod config;
mod gateway;
mod memory;
mod registry;

pub use config::RedisConfig;
pub use gateway::{GatewayConfig, RateLimitGateway};
pub use memory::InMemorySlidingWindowLimiter;
pub use registry::BucketRegistry;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisSlidingWindowLimiter, RedisWindowStore};
