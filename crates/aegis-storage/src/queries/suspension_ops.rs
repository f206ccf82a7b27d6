//! Suspension records. The partial unique index on open records enforces
//! the one-open-suspension-per-project invariant at the schema level.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use aegis_core::errors::{AegisError, AegisResult, StorageError};
use aegis_core::models::{Actor, SuspensionReason, SuspensionRecord};

use crate::to_storage_err;

/// Insert a new (open) suspension record.
pub fn insert_record(conn: &Connection, record: &SuspensionRecord) -> AegisResult<()> {
    let triggered_by = serde_json::to_string(&record.triggered_by)?;
    conn.execute(
        "INSERT INTO suspensions (id, project_id, reason, triggered_by, created_at, resolved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id.to_string(),
            record.project_id,
            record.reason.as_str(),
            triggered_by,
            record.created_at.to_rfc3339(),
            record.resolved_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// The open (unresolved) record for a project, if any.
pub fn open_record(conn: &Connection, project_id: &str) -> AegisResult<Option<SuspensionRecord>> {
    let raw = conn
        .query_row(
            "SELECT id, project_id, reason, triggered_by, created_at, resolved_at
             FROM suspensions WHERE project_id = ?1 AND resolved_at IS NULL",
            params![project_id],
            row_to_raw,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(decode_row).transpose()
}

/// Close the open record, pairing with the SUSPENDED → ACTIVE transition.
/// Returns the number of records resolved (0 or 1).
pub fn resolve_open(
    conn: &Connection,
    project_id: &str,
    resolved_at: DateTime<Utc>,
) -> AegisResult<usize> {
    conn.execute(
        "UPDATE suspensions SET resolved_at = ?2
         WHERE project_id = ?1 AND resolved_at IS NULL",
        params![project_id, resolved_at.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Full suspension history for a project, newest first.
pub fn list_by_project(conn: &Connection, project_id: &str) -> AegisResult<Vec<SuspensionRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, project_id, reason, triggered_by, created_at, resolved_at
             FROM suspensions WHERE project_id = ?1 ORDER BY created_at DESC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![project_id], row_to_raw)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.map(|raw| {
        raw.map_err(|e| to_storage_err(e.to_string()))
            .and_then(decode_row)
    })
    .collect()
}

type RawRow = (String, String, String, String, String, Option<String>);

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_row(
    (id, project_id, reason, triggered_by, created_at, resolved_at): RawRow,
) -> AegisResult<SuspensionRecord> {
    let decode_err = |reason: String| {
        AegisError::Storage(StorageError::RowDecodeFailed {
            table: "suspensions".to_string(),
            reason,
        })
    };
    Ok(SuspensionRecord {
        id: id
            .parse()
            .map_err(|e| decode_err(format!("id: {e}")))?,
        reason: SuspensionReason::parse(&reason)
            .ok_or_else(|| decode_err(format!("unknown reason {reason:?}")))?,
        triggered_by: serde_json::from_str::<Actor>(&triggered_by)
            .map_err(|e| decode_err(format!("triggered_by: {e}")))?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&chrono::Utc))
            .map_err(|e| decode_err(format!("created_at: {e}")))?,
        resolved_at: resolved_at
            .map(|t| {
                chrono::DateTime::parse_from_rfc3339(&t)
                    .map(|t| t.with_timezone(&chrono::Utc))
                    .map_err(|e| decode_err(format!("resolved_at: {e}")))
            })
            .transpose()?,
        project_id,
    })
}
