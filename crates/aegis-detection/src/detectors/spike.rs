//! Spike detector: request volume increase over the trailing baseline
//! window, as a percentage.

use chrono::{DateTime, Utc};

use aegis_core::config::DetectorPolicy;
use aegis_core::errors::AegisResult;
use aegis_core::models::DetectorKind;
use aegis_core::traits::IMetricsSource;

use super::Detector;

pub struct SpikeDetector {
    policy: DetectorPolicy,
}

impl SpikeDetector {
    pub fn new(policy: DetectorPolicy) -> Self {
        Self { policy }
    }
}

impl Detector for SpikeDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Spike
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
        let current = source.metric_window(project_id, window_start, now)?;
        // Baseline: the window of the same length immediately preceding.
        let baseline_start = window_start - (now - window_start);
        let baseline = source.metric_window(project_id, baseline_start, window_start)?;

        // No baseline traffic means no spike signal; new projects are not
        // flagged on their first window.
        let delta = if baseline.total_requests > 0 {
            (current.total_requests - baseline.total_requests) as f64
                / baseline.total_requests as f64
                * 100.0
        } else {
            0.0
        };
        let details = format!(
            "{} requests vs baseline {} ({delta:+.1}%)",
            current.total_requests, baseline.total_requests
        );
        Ok((delta, details))
    }
}
