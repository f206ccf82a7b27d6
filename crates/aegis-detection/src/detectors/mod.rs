//! Individual detectors. Each computes one metric value over the window;
//! classification and action mapping are shared in [`classify`].

pub mod error_rate;
pub mod pattern;
pub mod spike;

use chrono::{DateTime, Utc};

use aegis_core::config::DetectorPolicy;
use aegis_core::errors::AegisResult;
use aegis_core::models::{DetectionResult, DetectorKind, RecommendedAction};
use aegis_core::traits::IMetricsSource;

pub use error_rate::ErrorRateDetector;
pub use pattern::PatternDetector;
pub use spike::SpikeDetector;

/// One detector: a metric computation plus its policy.
pub trait Detector: Send + Sync {
    fn kind(&self) -> DetectorKind;

    fn policy(&self) -> &DetectorPolicy;

    /// Compute the metric value and a human-readable detail string for one
    /// project over `[window_start, now)`.
    fn compute(
        &self,
        source: &dyn IMetricsSource,
        project_id: &str,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AegisResult<(f64, String)>;
}

/// Shared classification: severity is a pure, monotonic function of the
/// metric value and the configured bands; the action comes from the
/// detector's policy table.
pub fn classify(
    detector: &dyn Detector,
    project_id: &str,
    metric_value: f64,
    details: String,
) -> DetectionResult {
    match detector.policy().thresholds.classify(metric_value) {
        Some(severity) => DetectionResult {
            project_id: project_id.to_string(),
            detector: detector.kind(),
            detected: true,
            metric_value,
            severity: Some(severity),
            recommended_action: detector.policy().action_for(severity),
            detected_at: Utc::now(),
            details,
        },
        None => DetectionResult {
            project_id: project_id.to_string(),
            detector: detector.kind(),
            detected: false,
            metric_value,
            severity: None,
            recommended_action: RecommendedAction::None,
            detected_at: Utc::now(),
            details,
        },
    }
}
