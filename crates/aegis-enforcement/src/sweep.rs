//! Periodic enforcement sweep: run the detection scan, persist results,
//! and hand actionable ones to the suspension manager.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use aegis_core::errors::AegisResult;
use aegis_core::models::{Actor, DetectionResult};
use aegis_detection::{DetectionEngine, ScanSummary};
use aegis_storage::{AuditLogger, StorageEngine};

use crate::suspension::SuspensionManager;

/// Outcome of one sweep run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub scan: ScanSummary,
    /// Projects suspended by this sweep (idempotent transitions that were
    /// already suspended are not counted).
    pub suspended: Vec<String>,
}

pub struct EnforcementSweep {
    engine: Arc<StorageEngine>,
    detection: DetectionEngine,
    suspensions: SuspensionManager,
}

impl EnforcementSweep {
    pub fn new(
        engine: Arc<StorageEngine>,
        detection: DetectionEngine,
        suspensions: SuspensionManager,
    ) -> Self {
        Self {
            engine,
            detection,
            suspensions,
        }
    }

    /// One scheduler tick. Detection failures are already isolated inside
    /// the scan; a failure persisting or applying one result is likewise
    /// logged and skipped so the rest of the batch lands.
    pub fn run(&self) -> AegisResult<SweepReport> {
        let scan = self.detection.scan_all_projects(self.engine.as_ref())?;

        let mut suspended = Vec::new();
        for result in &scan.detections {
            if let Err(e) = self.engine.record_detection(result) {
                tracing::warn!(
                    project_id = %result.project_id,
                    error = %e,
                    "failed to persist detection result"
                );
            }
            if !result.is_actionable() {
                continue;
            }
            if let Err(e) = self.audit_detection(result) {
                tracing::warn!(
                    project_id = %result.project_id,
                    error = %e,
                    "failed to audit detection result"
                );
            }
            match self.suspensions.apply_detection(result) {
                Ok(Some(outcome)) if outcome.changed => {
                    suspended.push(result.project_id.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        project_id = %result.project_id,
                        error = %e,
                        "failed to apply detection result"
                    );
                }
            }
        }

        Ok(SweepReport { scan, suspended })
    }

    /// Every actionable detection leaves an audit trail, whether or not it
    /// escalates to a suspension.
    fn audit_detection(&self, result: &DetectionResult) -> AegisResult<()> {
        self.engine.pool().writer.with_conn_sync(|conn| {
            AuditLogger::log_enforcement(
                conn,
                &Actor::System,
                "detection_flagged",
                "detection",
                result.detector.as_str(),
                &result.project_id,
                serde_json::json!({
                    "detector": result.detector.as_str(),
                    "severity": result.severity.map(|s| s.as_str()),
                    "recommended_action": result.recommended_action.as_str(),
                    "metric_value": result.metric_value,
                }),
            )
        })
    }
}
