//! Rate limiter port.

use async_trait::async_trait;

/// Rate limiter for API endpoints.
///
/// Implementations can use Redis, in-memory, or other backends.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if the given key is within rate limits.
    ///
    /// Returns true if the request is allowed, false if rate limited.
    async fn check_rate_limit(&self, key: &str) -> bool;
}
