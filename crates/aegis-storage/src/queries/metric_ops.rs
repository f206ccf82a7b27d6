//! Append-only metric samples and flagged accesses, plus windowed aggregation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use aegis_core::errors::AegisResult;
use aegis_core::models::{MetricSample, MetricWindow};

use crate::to_storage_err;

/// Insert one sample. Samples are never updated.
pub fn insert_sample(conn: &Connection, sample: &MetricSample) -> AegisResult<()> {
    conn.execute(
        "INSERT INTO error_metrics (project_id, request_count, error_count, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            sample.project_id,
            sample.request_count,
            sample.error_count,
            sample.recorded_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Aggregate counts over `[from, to)` for one project.
pub fn metric_window(
    conn: &Connection,
    project_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> AegisResult<MetricWindow> {
    conn.query_row(
        "SELECT COALESCE(SUM(request_count), 0), COALESCE(SUM(error_count), 0), COUNT(*)
         FROM error_metrics
         WHERE project_id = ?1 AND recorded_at >= ?2 AND recorded_at < ?3",
        params![project_id, from.to_rfc3339(), to.to_rfc3339()],
        |row| {
            Ok(MetricWindow {
                total_requests: row.get(0)?,
                total_errors: row.get(1)?,
                sample_count: row.get(2)?,
            })
        },
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Record one flagged access-pattern event.
pub fn insert_flagged_access(
    conn: &Connection,
    project_id: &str,
    pattern: &str,
    recorded_at: DateTime<Utc>,
) -> AegisResult<()> {
    conn.execute(
        "INSERT INTO flagged_accesses (project_id, pattern, recorded_at) VALUES (?1, ?2, ?3)",
        params![project_id, pattern, recorded_at.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Count flagged access events over `[from, to)`.
pub fn flagged_access_count(
    conn: &Connection,
    project_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> AegisResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM flagged_accesses
         WHERE project_id = ?1 AND recorded_at >= ?2 AND recorded_at < ?3",
        params![project_id, from.to_rfc3339(), to.to_rfc3339()],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
