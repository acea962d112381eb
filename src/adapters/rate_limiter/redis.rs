//! Redis-backed rate limiter implementation for production deployments.
//!
//! Uses a simple fixed-window counter algorithm with Redis INCR + EXPIRE.
//! Suitable for multi-server deployments.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::ports::RateLimiter;

use super::RateLimitSettings;

/// Redis-backed rate limiter for production multi-server deployments.
///
/// Uses a fixed-window counter algorithm:
/// 1. INCR the key to increment the counter
/// 2. If count is 1, set EXPIRE for the window duration
/// 3. If count > limit, deny the request
///
/// This approach is simple and atomic but has a known edge case at window
/// boundaries where requests can briefly exceed limits. For this
/// endpoint's purpose that is acceptable behavior.
///
/// A Redis failure allows the request and logs a warning.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    settings: RateLimitSettings,
}

impl RedisRateLimiter {
    /// Create a new Redis rate limiter.
    pub fn new(conn: MultiplexedConnection, settings: RateLimitSettings) -> Self {
        Self { conn, settings }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check_rate_limit(&self, key: &str) -> bool {
        let redis_key = format!("ratelimit:{}", key);
        let mut conn = self.conn.clone();

        // Atomic increment
        let count: i64 = match conn.incr(&redis_key, 1_i64).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, key = %redis_key, "Rate limit INCR failed");
                return true;
            }
        };

        // Set expiry on first request in window
        if count == 1 {
            if let Err(e) = conn
                .expire::<_, ()>(&redis_key, self.settings.window_secs as i64)
                .await
            {
                tracing::warn!(error = %e, key = %redis_key, "Rate limit EXPIRE failed");
            }
        }

        count as u32 <= self.settings.max_requests
    }
}
