use serde::{Deserialize, Serialize};

use super::defaults;

/// Override rate-limiter configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Attempts allowed per window per identifier.
    pub max_attempts: i64,
    /// Window duration (seconds).
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
            window_secs: defaults::DEFAULT_RATE_LIMIT_WINDOW_SECS,
        }
    }
}
