//! Redis sliding window rate limiter using a sorted set per identifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, ErrorKind, IntoConnectionInfo, RedisError, Script};
use tokio::sync::OnceCell;
use uuid::Uuid;

use formguard_core::domain::{ClientIdentifier, FailurePolicy, RateLimitBucket, RateLimitResult};
use formguard_core::ports::{Clock, RateLimitError, RateLimiter, SlidingWindowStore, SystemClock};

use super::RedisConfig;

/// Prune, count, conditionally add and refresh the TTL in one step.
/// Returns: [count_before_add, added]
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window_ms = tonumber(ARGV[2])
local max_requests = tonumber(ARGV[3])
local member = ARGV[4]
local ttl_secs = tonumber(ARGV[5])

redis.call('ZREMRANGEBYSCORE', key, '-inf', '(' .. (now - window_ms))
local count = redis.call('ZCARD', key)

local added = 0
if count < max_requests then
    redis.call('ZADD', key, now, member)
    added = 1
end

redis.call('EXPIRE', key, ttl_secs)
return {count, added}
"#;

/// Sorted-set window store on Redis.
///
/// The connection is established lazily on first use, so an unreachable
/// store surfaces per request (and goes through the failure policy)
/// instead of aborting startup.
pub struct RedisWindowStore {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    connect_timeout: Duration,
    script: Script,
}

impl RedisWindowStore {
    pub fn new(config: &RedisConfig) -> Result<Self, RateLimitError> {
        let mut info = config
            .url
            .as_str()
            .into_connection_info()
            .map_err(|e| RateLimitError::StoreUnavailable(e.to_string()))?;
        if !config.token.is_empty() {
            info.redis.password = Some(config.token.clone());
        }

        let client = Client::open(info).map_err(|e| RateLimitError::StoreUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            conn: OnceCell::new(),
            connect_timeout: config.connect_timeout,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, RateLimitError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                // Use timeout to prevent hanging if Redis is unreachable
                let conn = tokio::time::timeout(
                    self.connect_timeout,
                    ConnectionManager::new(self.client.clone()),
                )
                .await
                .map_err(|_| RateLimitError::StoreUnavailable("Connection timed out".to_string()))?
                .map_err(|e| RateLimitError::StoreUnavailable(e.to_string()))?;

                tracing::info!("Connected to Redis rate limit store");
                Ok::<_, RateLimitError>(conn)
            })
            .await?;

        Ok(conn.clone())
    }
}

fn map_redis_error(e: RedisError) -> RateLimitError {
    match e.kind() {
        ErrorKind::TypeError => RateLimitError::MalformedResponse(e.to_string()),
        _ => RateLimitError::StoreUnavailable(e.to_string()),
    }
}

#[async_trait]
impl SlidingWindowStore for RedisWindowStore {
    async fn record(
        &self,
        key: &str,
        member: &str,
        now_ms: u64,
        window_ms: u64,
        max_requests: u32,
        ttl_secs: u64,
    ) -> Result<u64, RateLimitError> {
        let mut conn = self.connection().await?;

        let reply: Vec<i64> = self
            .script
            .key(key)
            .arg(now_ms)
            .arg(window_ms)
            .arg(max_requests)
            .arg(member)
            .arg(ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        parse_reply(&reply)
    }
}

/// Count before the add from a `[count, added]` script reply.
fn parse_reply(reply: &[i64]) -> Result<u64, RateLimitError> {
    match reply {
        [count, _added, ..] if *count >= 0 => Ok(*count as u64),
        other => Err(RateLimitError::MalformedResponse(format!(
            "unexpected script reply {other:?}"
        ))),
    }
}

/// Distributed sliding window limiter.
///
/// Correctness across instances relies on [`SlidingWindowStore::record`]
/// being atomic. Store errors and timeouts resolve through the configured
/// [`FailurePolicy`].
pub struct RedisSlidingWindowLimiter {
    store: Arc<dyn SlidingWindowStore>,
    policy: FailurePolicy,
    command_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl RedisSlidingWindowLimiter {
    /// Create a limiter talking to the configured Redis.
    pub fn new(config: &RedisConfig, policy: FailurePolicy) -> Result<Self, RateLimitError> {
        let store = RedisWindowStore::new(config)?;
        tracing::info!(
            url = %config.redacted_url(),
            policy = policy.as_str(),
            "Redis rate limiter configured"
        );
        Ok(Self::with_store(
            Arc::new(store),
            policy,
            config.command_timeout,
            Arc::new(SystemClock),
        ))
    }

    pub fn with_store(
        store: Arc<dyn SlidingWindowStore>,
        policy: FailurePolicy,
        command_timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policy,
            command_timeout,
            clock,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }
}

#[async_trait]
impl RateLimiter for RedisSlidingWindowLimiter {
    async fn limit(
        &self,
        bucket: &RateLimitBucket,
        identifier: &ClientIdentifier,
    ) -> RateLimitResult {
        let now = self.clock.now_ms();
        let key = bucket.storage_key(identifier.as_str());
        // Unique member so same-millisecond requests don't collapse.
        let member = format!("{}-{}", now, Uuid::new_v4().simple());

        let record = self.store.record(
            &key,
            &member,
            now,
            bucket.window_ms(),
            bucket.max_requests(),
            bucket.window_secs_ceil(),
        );

        let outcome = match tokio::time::timeout(self.command_timeout, record).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RateLimitError::Timeout(self.command_timeout.as_millis() as u64)),
        };

        let count = match outcome {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    identifier = %identifier,
                    bucket = bucket.name(),
                    policy = self.policy.as_str(),
                    "Rate limit store failed, applying failure policy"
                );
                return self.policy.fallback(bucket, now);
            }
        };

        let max = bucket.max_requests();
        let used = count.saturating_add(1);
        let reset = now + bucket.window_ms();

        if used <= u64::from(max) {
            RateLimitResult::admitted(max, used as u32, reset)
        } else {
            tracing::warn!(
                identifier = %identifier,
                bucket = bucket.name(),
                used,
                limit = max,
                "Rate limit exceeded"
            );
            RateLimitResult::denied(max, reset)
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
