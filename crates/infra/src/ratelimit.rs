//! Fixed-window rate-limit counters.
//!
//! Counters live in Redis so the window is shared across every server
//! instance; the in-memory variant backs tests and single-node development.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;

use huddle_core::{CoreError, CoreResult};

const REDIS_CALL_TIMEOUT: Duration = Duration::from_secs(2);

/// Counter store for fixed-window rate limiting.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record a hit against `key` and return the hit count within the
    /// current window (the window starts at the first hit).
    async fn record_hit(&self, key: &str, window: Duration) -> CoreResult<u64>;
}

/// Redis-backed counters (INCR + EXPIRE on first hit).
pub struct RedisRateLimitStore {
    client: redis::Client,
}

impl RedisRateLimitStore {
    pub fn new(redis_url: &str) -> CoreResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CoreError::persistence(format!("redis client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn record_hit(&self, key: &str, window: Duration) -> CoreResult<u64> {
        let hit = async {
            let mut conn = self
                .client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| CoreError::persistence(format!("redis connect: {e}")))?;

            let count: u64 = conn
                .incr(key, 1u64)
                .await
                .map_err(|e| CoreError::persistence(format!("redis incr: {e}")))?;

            if count == 1 {
                let _: i64 = conn
                    .expire(key, window.as_secs() as i64)
                    .await
                    .map_err(|e| CoreError::persistence(format!("redis expire: {e}")))?;
            }

            Ok(count)
        };

        tokio::time::timeout(REDIS_CALL_TIMEOUT, hit)
            .await
            .map_err(|_| CoreError::timeout("ratelimit.record_hit"))?
    }
}

/// In-memory fixed-window counters for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, (Instant, u64)>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn record_hit(&self, key: &str, window: Duration) -> CoreResult<u64> {
        let mut windows = self.windows.lock().expect("rate-limit table poisoned");
        let now = Instant::now();

        let entry = windows.entry(key.to_owned()).or_insert((now, 0));
        if now.duration_since(entry.0) >= window {
            *entry = (now, 0);
        }
        entry.1 += 1;

        Ok(entry.1)
    }
}
