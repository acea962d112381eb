//! Rate limiter adapters - fixed-window counters.

mod in_memory;
mod redis;

pub use in_memory::InMemoryRateLimiter;
pub use redis::RedisRateLimiter;

/// Fixed-window rate limit settings.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    /// Maximum requests allowed per window.
    pub max_requests: u32,
    /// Window duration in seconds.
    pub window_secs: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_secs: 60,
        }
    }
}
