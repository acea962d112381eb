//! Redis configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Redis configuration
///
/// Optional: when absent the service falls back to the in-memory rate
/// limiter, which is fine for single-instance deployments.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RedisConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate Redis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS_URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
