//! Detection result history, persisted per scan.

use rusqlite::{params, Connection};

use aegis_core::errors::{AegisError, AegisResult, StorageError};
use aegis_core::models::{DetectionResult, DetectorKind, RecommendedAction, Severity};

use crate::to_storage_err;

/// Persist one detection result.
pub fn insert_result(conn: &Connection, result: &DetectionResult) -> AegisResult<()> {
    conn.execute(
        "INSERT INTO detection_results (
            project_id, detector, detected, metric_value, severity,
            recommended_action, detected_at, details
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            result.project_id,
            result.detector.as_str(),
            result.detected as i32,
            result.metric_value,
            result.severity.map(|s| s.as_str()),
            result.recommended_action.as_str(),
            result.detected_at.to_rfc3339(),
            result.details,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Detection history for a project, newest first.
pub fn history(
    conn: &Connection,
    project_id: &str,
    limit: usize,
) -> AegisResult<Vec<DetectionResult>> {
    let mut stmt = conn
        .prepare(
            "SELECT project_id, detector, detected, metric_value, severity,
                    recommended_action, detected_at, details
             FROM detection_results WHERE project_id = ?1
             ORDER BY detected_at DESC LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![project_id, limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.map(|raw| {
        raw.map_err(|e| to_storage_err(e.to_string()))
            .and_then(decode_row)
    })
    .collect()
}

fn decode_row(
    (project_id, detector, detected, metric_value, severity, action, detected_at, details): (
        String,
        String,
        i64,
        f64,
        Option<String>,
        String,
        String,
        String,
    ),
) -> AegisResult<DetectionResult> {
    let decode_err = |reason: String| {
        AegisError::Storage(StorageError::RowDecodeFailed {
            table: "detection_results".to_string(),
            reason,
        })
    };
    Ok(DetectionResult {
        detector: DetectorKind::parse(&detector)
            .ok_or_else(|| decode_err(format!("unknown detector {detector:?}")))?,
        detected: detected != 0,
        metric_value,
        severity: severity
            .map(|s| {
                Severity::parse(&s).ok_or_else(|| decode_err(format!("unknown severity {s:?}")))
            })
            .transpose()?,
        recommended_action: RecommendedAction::parse(&action)
            .ok_or_else(|| decode_err(format!("unknown action {action:?}")))?,
        detected_at: chrono::DateTime::parse_from_rfc3339(&detected_at)
            .map(|t| t.with_timezone(&chrono::Utc))
            .map_err(|e| decode_err(format!("detected_at: {e}")))?,
        details,
        project_id,
    })
}
