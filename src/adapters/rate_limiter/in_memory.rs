//! In-memory rate limiter implementation for testing and development.
//!
//! Uses a fixed-window counter algorithm with an in-memory HashMap.
//! Not suitable for production multi-server deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::RateLimiter;

use super::RateLimitSettings;

/// In-memory rate limiter for testing and single-server deployments.
///
/// Uses a fixed-window counter algorithm. Each window tracks the count
/// of requests and resets when the window expires.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    settings: RateLimitSettings,
    /// Per-key window state.
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    /// Number of requests in the current window.
    count: u32,
    /// When the current window started.
    window_start: u64,
}

impl InMemoryRateLimiter {
    /// Create a new in-memory rate limiter.
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            settings,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a rate limiter with default settings.
    pub fn with_defaults() -> Self {
        Self::new(RateLimitSettings::default())
    }

    fn now_secs() -> u64 {
        Timestamp::now().as_unix_secs()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check_rate_limit(&self, key: &str) -> bool {
        let now = Self::now_secs();
        let mut windows = self.windows.write().await;

        let state = windows.entry(key.to_string()).or_insert(WindowState {
            count: 0,
            window_start: now,
        });

        if now.saturating_sub(state.window_start) >= self.settings.window_secs as u64 {
            state.count = 0;
            state.window_start = now;
        }

        state.count += 1;
        state.count <= self.settings.max_requests
    }
}
