//! Retention pruning, checkpoint, integrity check.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};

use aegis_core::errors::AegisResult;

use crate::to_storage_err;

/// Delete metric samples older than `days`. Returns count deleted.
pub fn prune_metric_samples(conn: &Connection, days: u64) -> AegisResult<usize> {
    let cutoff = Utc::now() - Duration::days(days as i64);
    conn.execute(
        "DELETE FROM error_metrics WHERE recorded_at < ?1",
        params![cutoff.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Delete flagged access events older than `days`. Returns count deleted.
pub fn prune_flagged_accesses(conn: &Connection, days: u64) -> AegisResult<usize> {
    let cutoff = Utc::now() - Duration::days(days as i64);
    conn.execute(
        "DELETE FROM flagged_accesses WHERE recorded_at < ?1",
        params![cutoff.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// WAL checkpoint. The pragma reports (busy, log, checkpointed); only
/// failure matters here.
pub fn wal_checkpoint(conn: &Connection) -> AegisResult<()> {
    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Run integrity check. Returns true if the database is OK.
pub fn integrity_check(conn: &Connection) -> AegisResult<bool> {
    let result: String = conn
        .query_row("PRAGMA integrity_check", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(result == "ok")
}
