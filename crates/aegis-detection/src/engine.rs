//! DetectionEngine — runs all detectors over the active project set with
//! catch-and-continue isolation per project.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use aegis_core::config::DetectionConfig;
use aegis_core::errors::{AegisResult, DetectionError};
use aegis_core::models::{DetectionResult, Severity};
use aegis_core::traits::IMetricsSource;

use crate::detectors::{classify, Detector, ErrorRateDetector, PatternDetector, SpikeDetector};

/// Job summary for one batch scan. `projects_checked` includes projects
/// whose individual check failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub projects_checked: usize,
    pub detections: Vec<DetectionResult>,
    pub detections_by_severity: HashMap<Severity, usize>,
    /// One entry per project whose check failed; excluded from `detections`.
    pub failures: Vec<String>,
}

/// Owns the three detectors and the shared window/gate configuration.
pub struct DetectionEngine {
    window_secs: u64,
    min_sample_size: i64,
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectionEngine {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            window_secs: config.window_secs,
            min_sample_size: config.min_sample_size,
            detectors: vec![
                Box::new(ErrorRateDetector::new(config.error_rate.clone())),
                Box::new(SpikeDetector::new(config.spike.clone())),
                Box::new(PatternDetector::new(config.pattern.clone())),
            ],
        }
    }

    /// Run every detector against one project. Fails as a unit: a detector
    /// error fails this project's check (the batch isolates it).
    pub fn check_project(
        &self,
        source: &dyn IMetricsSource,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<DetectionResult>, DetectionError> {
        let window_start = now - Duration::seconds(self.window_secs as i64);
        let gate = self
            .window_total(source, project_id, window_start, now)
            .map_err(|e| DetectionError {
                project_id: project_id.to_string(),
                detector: "gate".to_string(),
                reason: e.to_string(),
            })?;

        // Below the sample gate nothing fires, regardless of error counts.
        if gate < self.min_sample_size {
            return Ok(self
                .detectors
                .iter()
                .map(|d| DetectionResult::clean(project_id, d.kind(), 0.0))
                .collect());
        }

        let mut results = Vec::with_capacity(self.detectors.len());
        for detector in &self.detectors {
            let (value, details) = detector
                .compute(source, project_id, window_start, now)
                .map_err(|e| DetectionError {
                    project_id: project_id.to_string(),
                    detector: detector.kind().as_str().to_string(),
                    reason: e.to_string(),
                })?;
            results.push(classify(detector.as_ref(), project_id, value, details));
        }
        Ok(results)
    }

    /// Scan every ACTIVE project. A failure checking one project never
    /// aborts the batch: it is logged, counted, and the scan moves on.
    pub fn scan_all_projects(&self, source: &dyn IMetricsSource) -> AegisResult<ScanSummary> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let project_ids = source.active_project_ids()?;

        let mut detections = Vec::new();
        let mut failures = Vec::new();
        for project_id in &project_ids {
            match self.check_project(source, project_id, started_at) {
                Ok(results) => detections.extend(results.into_iter().filter(|r| r.detected)),
                Err(e) => {
                    tracing::warn!(
                        project_id = %e.project_id,
                        detector = %e.detector,
                        reason = %e.reason,
                        "project check failed, continuing scan"
                    );
                    failures.push(e.project_id.clone());
                }
            }
        }

        let mut detections_by_severity: HashMap<Severity, usize> = HashMap::new();
        for result in &detections {
            if let Some(severity) = result.severity {
                *detections_by_severity.entry(severity).or_insert(0) += 1;
            }
        }

        let summary = ScanSummary {
            started_at,
            duration_ms: timer.elapsed().as_millis() as u64,
            projects_checked: project_ids.len(),
            detections,
            detections_by_severity,
            failures,
        };
        tracing::info!(
            projects_checked = summary.projects_checked,
            detections = summary.detections.len(),
            failures = summary.failures.len(),
            duration_ms = summary.duration_ms,
            "detection scan complete"
        );
        Ok(summary)
    }

    fn window_total(
        &self,
        source: &dyn IMetricsSource,
        project_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AegisResult<i64> {
        Ok(source.metric_window(project_id, from, to)?.total_requests)
    }
}
