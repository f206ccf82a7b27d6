//! Error-rate detector: errors / total requests × 100 over the window.

use chrono::{DateTime, Utc};

use aegis_core::config::DetectorPolicy;
use aegis_core::errors::AegisResult;
use aegis_core::models::DetectorKind;
use aegis_core::traits::IMetricsSource;

use super::Detector;

pub struct ErrorRateDetector {
    policy: DetectorPolicy,
}

impl ErrorRateDetector {
    pub fn new(policy: DetectorPolicy) -> Self {
        Self { policy }
    }
}

impl Detector for ErrorRateDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ErrorRate
    }

    fn policy(&self) -> &DetectorPolicy {
        &self.policy
    }

    fn compute(
        &self,
        source: &dyn IMetricsSource,
        project_id: &str,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AegisResult<(f64, String)> {
        let window = source.metric_window(project_id, window_start, now)?;
        let rate = window.error_rate();
        let details = format!(
            "{} errors out of {} requests ({rate:.1}% error rate)",
            window.total_errors, window.total_requests
        );
        Ok((rate, details))
    }
}
