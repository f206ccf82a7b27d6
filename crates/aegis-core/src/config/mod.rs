//! Externalized configuration. Thresholds, windows, gates, quotas, and
//! retry ceilings are inputs, never hardcoded policy.

pub mod detection_config;
pub mod notify_config;
pub mod rate_limit_config;

pub use detection_config::{DetectionConfig, DetectorPolicy, ThresholdBands};
pub use notify_config::NotifyConfig;
pub use rate_limit_config::RateLimitConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{AegisError, AegisResult};

/// Default values shared by the config structs.
pub mod defaults {
    /// Sliding detection window (24h).
    pub const DEFAULT_DETECTION_WINDOW_SECS: u64 = 86_400;
    /// Minimum requests in the window before a detector may fire.
    pub const DEFAULT_MIN_SAMPLE_SIZE: i64 = 100;
    /// Error-rate bands (percent).
    pub const DEFAULT_ERROR_RATE_WARNING: f64 = 50.0;
    pub const DEFAULT_ERROR_RATE_CRITICAL: f64 = 70.0;
    pub const DEFAULT_ERROR_RATE_SEVERE: f64 = 90.0;
    /// Spike bands (percent increase over baseline).
    pub const DEFAULT_SPIKE_WARNING: f64 = 200.0;
    pub const DEFAULT_SPIKE_CRITICAL: f64 = 500.0;
    pub const DEFAULT_SPIKE_SEVERE: f64 = 1000.0;
    /// Pattern bands (flagged accesses per window).
    pub const DEFAULT_PATTERN_WARNING: f64 = 10.0;
    pub const DEFAULT_PATTERN_CRITICAL: f64 = 50.0;
    pub const DEFAULT_PATTERN_SEVERE: f64 = 200.0;
    /// Override rate limit: attempts per window per operator.
    pub const DEFAULT_RATE_LIMIT_MAX_ATTEMPTS: i64 = 10;
    pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 3_600;
    /// Notification retry ceiling.
    pub const DEFAULT_NOTIFY_MAX_ATTEMPTS: u32 = 5;
}

/// Top-level configuration for the subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AegisConfig {
    pub detection: DetectionConfig,
    pub rate_limit: RateLimitConfig,
    pub notify: NotifyConfig,
}

impl AegisConfig {
    /// Parse a TOML document. Missing sections and fields fall back to
    /// defaults.
    pub fn from_toml_str(s: &str) -> AegisResult<Self> {
        toml::from_str(s).map_err(|e| AegisError::Config(e.to_string()))
    }
}
