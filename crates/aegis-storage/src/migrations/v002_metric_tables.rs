//! v002: error_metrics, flagged_accesses, detection_results.

use rusqlite::Connection;

use aegis_core::errors::AegisResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AegisResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS error_metrics (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id    TEXT NOT NULL,
            request_count INTEGER NOT NULL CHECK (request_count >= 0),
            error_count   INTEGER NOT NULL CHECK (error_count >= 0),
            recorded_at   TEXT NOT NULL
        );

        -- Composite index for windowed aggregation.
        CREATE INDEX IF NOT EXISTS idx_error_metrics_project_time
            ON error_metrics(project_id, recorded_at DESC);

        CREATE TABLE IF NOT EXISTS flagged_accesses (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id  TEXT NOT NULL,
            pattern     TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_flagged_accesses_project_time
            ON flagged_accesses(project_id, recorded_at DESC);

        CREATE TABLE IF NOT EXISTS detection_results (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id         TEXT NOT NULL,
            detector           TEXT NOT NULL,
            detected           INTEGER NOT NULL,
            metric_value       REAL NOT NULL,
            severity           TEXT,
            recommended_action TEXT NOT NULL,
            detected_at        TEXT NOT NULL,
            details            TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_detection_results_project
            ON detection_results(project_id, detected_at DESC);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
