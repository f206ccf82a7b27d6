//! Pattern detector: frequency of flagged access-pattern events in the window.

use chrono::{DateTime, Utc};

use aegis_core::config::DetectorPolicy;
use aegis_core::errors::AegisResult;
use aegis_core::models::DetectorKind;
use aegis_core::traits::IMetricsSource;

use super::Detector;

pub struct PatternDetector {
    policy: DetectorPolicy,
}

impl PatternDetector {
    pub fn new(policy: DetectorPolicy) -> Self {
        Self { policy }
    }
}

impl Detector for PatternDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Pattern
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
        let count = source.flagged_access_count(project_id, window_start, now)?;
        let details = format!("{count} flagged access events in window");
        Ok((count as f64, details))
    }
}
