//! Append-only request/error counters recorded by the request-logging collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sampling-interval row in `error_metrics`. Never updated, only
/// inserted and eventually pruned by retention policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub project_id: String,
    pub request_count: i64,
    pub error_count: i64,
    pub recorded_at: DateTime<Utc>,
}

impl MetricSample {
    pub fn new(project_id: &str, request_count: i64, error_count: i64) -> Self {
        Self {
            project_id: project_id.to_string(),
            request_count,
            error_count,
            recorded_at: Utc::now(),
        }
    }
}

/// Windowed aggregate over samples, the input every detector works from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricWindow {
    pub total_requests: i64,
    pub total_errors: i64,
    pub sample_count: i64,
}

impl MetricWindow {
    /// Error rate as a percentage; 0 when there is no traffic.
    pub fn error_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.total_errors as f64 / self.total_requests as f64 * 100.0
        } else {
            0.0
        }
    }
}
