use chrono::{DateTime, Utc};

use crate::errors::AegisResult;
use crate::models::metric_sample::MetricWindow;

/// Read side of the metrics store as seen by the detectors.
///
/// Implemented by the storage engine; detectors stay free of any direct
/// persistence dependency.
pub trait IMetricsSource: Send + Sync {
    /// Projects currently in ACTIVE status, the scan population.
    fn active_project_ids(&self) -> AegisResult<Vec<String>>;

    /// Aggregate request/error counts over `[from, to)`.
    fn metric_window(
        &self,
        project_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AegisResult<MetricWindow>;

    /// Number of flagged access-pattern events recorded in `[from, to)`.
    fn flagged_access_count(
        &self,
        project_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AegisResult<i64>;
}
