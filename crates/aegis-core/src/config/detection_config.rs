//! Detection subsystem configuration: windows, gates, threshold bands, and
//! the severity → action mapping tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::{RecommendedAction, Severity};

/// Ordered threshold bands mapping a metric value to a severity tier.
///
/// Invariant: `warning <= critical <= severe`. Classification is monotonic:
/// a strictly higher metric value never yields a lower severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBands {
    pub warning: f64,
    pub critical: f64,
    pub severe: f64,
}

impl ThresholdBands {
    /// Classify a metric value. `None` below the warning band.
    pub fn classify(&self, value: f64) -> Option<Severity> {
        if value >= self.severe {
            Some(Severity::Severe)
        } else if value >= self.critical {
            Some(Severity::Critical)
        } else if value >= self.warning {
            Some(Severity::Warning)
        } else {
            None
        }
    }
}

/// Per-detector policy: bands plus the severity → action table. A table,
/// not an if/else ladder, so new policies are config additions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorPolicy {
    pub thresholds: ThresholdBands,
    pub actions: HashMap<Severity, RecommendedAction>,
}

impl DetectorPolicy {
    /// Action for a severity tier; unmapped tiers notify only.
    pub fn action_for(&self, severity: Severity) -> RecommendedAction {
        self.actions
            .get(&severity)
            .copied()
            .unwrap_or(RecommendedAction::Warning)
    }
}

/// Detection subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Sliding window for metric aggregation (seconds).
    pub window_secs: u64,
    /// Below this many requests in the window, detectors return no
    /// detection (no false positives on low-traffic projects).
    pub min_sample_size: i64,
    pub error_rate: DetectorPolicy,
    pub spike: DetectorPolicy,
    pub pattern: DetectorPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_secs: defaults::DEFAULT_DETECTION_WINDOW_SECS,
            min_sample_size: defaults::DEFAULT_MIN_SAMPLE_SIZE,
            error_rate: DetectorPolicy {
                thresholds: ThresholdBands {
                    warning: defaults::DEFAULT_ERROR_RATE_WARNING,
                    critical: defaults::DEFAULT_ERROR_RATE_CRITICAL,
                    severe: defaults::DEFAULT_ERROR_RATE_SEVERE,
                },
                actions: HashMap::from([
                    (Severity::Warning, RecommendedAction::Warning),
                    (Severity::Critical, RecommendedAction::Investigate),
                    (Severity::Severe, RecommendedAction::Investigate),
                ]),
            },
            spike: DetectorPolicy {
                thresholds: ThresholdBands {
                    warning: defaults::DEFAULT_SPIKE_WARNING,
                    critical: defaults::DEFAULT_SPIKE_CRITICAL,
                    severe: defaults::DEFAULT_SPIKE_SEVERE,
                },
                actions: HashMap::from([
                    (Severity::Warning, RecommendedAction::Warning),
                    (Severity::Critical, RecommendedAction::Investigate),
                    (Severity::Severe, RecommendedAction::Suspend),
                ]),
            },
            pattern: DetectorPolicy {
                thresholds: ThresholdBands {
                    warning: defaults::DEFAULT_PATTERN_WARNING,
                    critical: defaults::DEFAULT_PATTERN_CRITICAL,
                    severe: defaults::DEFAULT_PATTERN_SEVERE,
                },
                actions: HashMap::from([
                    (Severity::Warning, RecommendedAction::Warning),
                    (Severity::Critical, RecommendedAction::Suspend),
                    (Severity::Severe, RecommendedAction::Suspend),
                ]),
            },
        }
    }
}
