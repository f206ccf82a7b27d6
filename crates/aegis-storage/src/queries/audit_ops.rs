//! Append-only audit log inserts and forensic queries.

use rusqlite::{params, Connection};

use aegis_core::errors::{AegisError, AegisResult, StorageError};
use aegis_core::models::{ActorType, AuditLogEntry};

use crate::to_storage_err;

/// Append one entry. The audit log is never updated or deleted by
/// application logic.
pub fn insert_entry(conn: &Connection, entry: &AuditLogEntry) -> AegisResult<()> {
    let metadata = serde_json::to_string(&entry.metadata)?;
    conn.execute(
        "INSERT INTO audit_logs (
            actor_id, actor_type, action, target_type, target_id, project_id,
            metadata, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.actor_id,
            entry.actor_type.as_str(),
            entry.action,
            entry.target_type,
            entry.target_id,
            entry.project_id,
            metadata,
            entry.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// All entries for a project, oldest first.
pub fn query_by_project(conn: &Connection, project_id: &str) -> AegisResult<Vec<AuditLogEntry>> {
    query_filtered(
        conn,
        "SELECT actor_id, actor_type, action, target_type, target_id, project_id,
                metadata, created_at
         FROM audit_logs WHERE project_id = ?1 ORDER BY created_at ASC",
        project_id,
    )
}

/// All entries with a given action, oldest first.
pub fn query_by_action(conn: &Connection, action: &str) -> AegisResult<Vec<AuditLogEntry>> {
    query_filtered(
        conn,
        "SELECT actor_id, actor_type, action, target_type, target_id, project_id,
                metadata, created_at
         FROM audit_logs WHERE action = ?1 ORDER BY created_at ASC",
        action,
    )
}

fn query_filtered(conn: &Connection, sql: &str, arg: &str) -> AegisResult<Vec<AuditLogEntry>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![arg], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
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
    (actor_id, actor_type, action, target_type, target_id, project_id, metadata, created_at): (
        String,
        String,
        String,
        String,
        String,
        Option<String>,
        String,
        String,
    ),
) -> AegisResult<AuditLogEntry> {
    let decode_err = |reason: String| {
        AegisError::Storage(StorageError::RowDecodeFailed {
            table: "audit_logs".to_string(),
            reason,
        })
    };
    Ok(AuditLogEntry {
        actor_type: ActorType::parse(&actor_type)
            .ok_or_else(|| decode_err(format!("unknown actor_type {actor_type:?}")))?,
        metadata: serde_json::from_str(&metadata)
            .map_err(|e| decode_err(format!("metadata: {e}")))?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&chrono::Utc))
            .map_err(|e| decode_err(format!("created_at: {e}")))?,
        actor_id,
        action,
        target_type,
        target_id,
        project_id,
    })
}
