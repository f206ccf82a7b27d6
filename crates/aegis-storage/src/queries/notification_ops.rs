//! Notification delivery queue: enqueue, mark outcomes, retry candidates.

use chrono::Utc;
use rusqlite::{params, Connection};

use aegis_core::errors::{AegisError, AegisResult, StorageError};
use aegis_core::models::{Channel, DeliveryStatus, Notification};

use crate::to_storage_err;

/// Enqueue a notification in `pending` state.
pub fn insert_notification(conn: &Connection, n: &Notification) -> AegisResult<()> {
    conn.execute(
        "INSERT INTO notifications (
            id, project_id, channel, recipient, subject, body, status,
            attempt_count, last_error, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            n.id.to_string(),
            n.project_id,
            n.channel.as_str(),
            n.recipient,
            n.subject,
            n.body,
            n.status.as_str(),
            n.attempt_count,
            n.last_error,
            n.created_at.to_rfc3339(),
            n.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Record the outcome of one delivery attempt.
pub fn mark_attempt(
    conn: &Connection,
    id: &uuid::Uuid,
    status: DeliveryStatus,
    error: Option<&str>,
) -> AegisResult<()> {
    conn.execute(
        "UPDATE notifications
         SET status = ?2, attempt_count = attempt_count + 1, last_error = ?3, updated_at = ?4
         WHERE id = ?1",
        params![
            id.to_string(),
            status.as_str(),
            error,
            Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Failed notifications still below the attempt ceiling, oldest first.
pub fn retry_candidates(conn: &Connection, max_attempts: u32) -> AegisResult<Vec<Notification>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, project_id, channel, recipient, subject, body, status,
                    attempt_count, last_error, created_at, updated_at
             FROM notifications
             WHERE status = 'failed' AND attempt_count < ?1
             ORDER BY created_at ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![max_attempts], row_to_raw)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.map(|raw| {
        raw.map_err(|e| to_storage_err(e.to_string()))
            .and_then(decode_row)
    })
    .collect()
}

/// Mark failed notifications at or above the ceiling as dead. Returns the
/// number marked.
pub fn mark_dead_at_ceiling(conn: &Connection, max_attempts: u32) -> AegisResult<usize> {
    conn.execute(
        "UPDATE notifications SET status = 'dead', updated_at = ?2
         WHERE status = 'failed' AND attempt_count >= ?1",
        params![max_attempts, Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// All notifications for a project (test and status surfaces).
pub fn list_by_project(conn: &Connection, project_id: &str) -> AegisResult<Vec<Notification>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, project_id, channel, recipient, subject, body, status,
                    attempt_count, last_error, created_at, updated_at
             FROM notifications WHERE project_id = ?1 ORDER BY created_at ASC",
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

#[allow(clippy::type_complexity)]
type RawRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    u32,
    Option<String>,
    String,
    String,
);

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
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
        row.get(9)?,
        row.get(10)?,
    ))
}

fn decode_row(
    (id, project_id, channel, recipient, subject, body, status, attempt_count, last_error, created_at, updated_at): RawRow,
) -> AegisResult<Notification> {
    let decode_err = |reason: String| {
        AegisError::Storage(StorageError::RowDecodeFailed {
            table: "notifications".to_string(),
            reason,
        })
    };
    Ok(Notification {
        id: id.parse().map_err(|e| decode_err(format!("id: {e}")))?,
        channel: Channel::parse(&channel)
            .ok_or_else(|| decode_err(format!("unknown channel {channel:?}")))?,
        status: DeliveryStatus::parse(&status)
            .ok_or_else(|| decode_err(format!("unknown status {status:?}")))?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&chrono::Utc))
            .map_err(|e| decode_err(format!("created_at: {e}")))?,
        updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at)
            .map(|t| t.with_timezone(&chrono::Utc))
            .map_err(|e| decode_err(format!("updated_at: {e}")))?,
        project_id,
        recipient,
        subject,
        body,
        attempt_count,
        last_error,
    })
}
