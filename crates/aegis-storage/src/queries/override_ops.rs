//! Immutable override records with full before/after state snapshots.

use rusqlite::{params, Connection};

use aegis_core::constants::{DEFAULT_OVERRIDE_HISTORY_LIMIT, MAX_OVERRIDE_HISTORY_LIMIT};
use aegis_core::errors::{AegisError, AegisResult, StorageError};
use aegis_core::models::{OverrideAction, OverrideRecord};

use crate::to_storage_err;

/// Insert an override record. Records are never updated or deleted.
pub fn insert_record(conn: &Connection, record: &OverrideRecord) -> AegisResult<()> {
    let previous = serde_json::to_string(&record.previous_state)?;
    let new = serde_json::to_string(&record.new_state)?;
    conn.execute(
        "INSERT INTO overrides (
            id, project_id, action, reason, notes, performed_by, performed_at,
            previous_state, new_state
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id.to_string(),
            record.project_id,
            record.action.as_str(),
            record.reason,
            record.notes,
            record.performed_by,
            record.performed_at.to_rfc3339(),
            previous,
            new,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Override history for a project, newest first. `limit` is clamped to
/// [1, 100]; `None` means the default of 50.
pub fn list_by_project(
    conn: &Connection,
    project_id: &str,
    limit: Option<usize>,
) -> AegisResult<Vec<OverrideRecord>> {
    let limit = limit
        .unwrap_or(DEFAULT_OVERRIDE_HISTORY_LIMIT)
        .clamp(1, MAX_OVERRIDE_HISTORY_LIMIT);
    let mut stmt = conn
        .prepare(
            "SELECT id, project_id, action, reason, notes, performed_by, performed_at,
                    previous_state, new_state
             FROM overrides WHERE project_id = ?1
             ORDER BY performed_at DESC LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![project_id, limit], row_to_raw)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.map(|raw| {
        raw.map_err(|e| to_storage_err(e.to_string()))
            .and_then(decode_row)
    })
    .collect()
}

#[allow(clippy::type_complexity)]
fn row_to_raw(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<(
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    String,
)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn decode_row(
    (id, project_id, action, reason, notes, performed_by, performed_at, previous, new): (
        String,
        String,
        String,
        String,
        Option<String>,
        String,
        String,
        String,
        String,
    ),
) -> AegisResult<OverrideRecord> {
    let decode_err = |reason: String| {
        AegisError::Storage(StorageError::RowDecodeFailed {
            table: "overrides".to_string(),
            reason,
        })
    };
    Ok(OverrideRecord {
        id: id.parse().map_err(|e| decode_err(format!("id: {e}")))?,
        action: OverrideAction::parse(&action)
            .ok_or_else(|| decode_err(format!("unknown action {action:?}")))?,
        reason,
        notes,
        performed_by,
        performed_at: chrono::DateTime::parse_from_rfc3339(&performed_at)
            .map(|t| t.with_timezone(&chrono::Utc))
            .map_err(|e| decode_err(format!("performed_at: {e}")))?,
        previous_state: serde_json::from_str(&previous)
            .map_err(|e| decode_err(format!("previous_state: {e}")))?,
        new_state: serde_json::from_str(&new)
            .map_err(|e| decode_err(format!("new_state: {e}")))?,
        project_id,
    })
}
