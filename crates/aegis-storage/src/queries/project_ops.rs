//! Project enforcement state: CRUD plus the atomic quota increment.

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use aegis_core::errors::{AegisError, AegisResult, StorageError};
use aegis_core::models::{ProjectEnforcementState, ProjectStatus, SuspensionReason};

use crate::to_storage_err;

/// Insert a freshly provisioned project.
pub fn insert_project(conn: &Connection, state: &ProjectEnforcementState) -> AegisResult<()> {
    let caps = serde_json::to_string(&state.caps)?;
    let usage = serde_json::to_string(&state.usage)?;
    conn.execute(
        "INSERT INTO projects (project_id, status, caps, usage, suspended_at, suspension_reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            state.project_id,
            state.status.as_str(),
            caps,
            usage,
            state.suspended_at.map(|t| t.to_rfc3339()),
            state.suspension_reason.map(|r| r.as_str()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Fetch a project's enforcement state.
pub fn get_project(conn: &Connection, project_id: &str) -> AegisResult<Option<ProjectEnforcementState>> {
    let raw = conn
        .query_row(
            "SELECT project_id, status, caps, usage, suspended_at, suspension_reason
             FROM projects WHERE project_id = ?1",
            params![project_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    raw.map(decode_project_row).transpose()
}

fn decode_project_row(
    (project_id, status, caps, usage, suspended_at, reason): (
        String,
        String,
        String,
        String,
        Option<String>,
        Option<String>,
    ),
) -> AegisResult<ProjectEnforcementState> {
    let decode_err = |reason: String| {
        AegisError::Storage(StorageError::RowDecodeFailed {
            table: "projects".to_string(),
            reason,
        })
    };
    Ok(ProjectEnforcementState {
        status: ProjectStatus::parse(&status)
            .ok_or_else(|| decode_err(format!("unknown status {status:?}")))?,
        caps: serde_json::from_str::<HashMap<String, i64>>(&caps)
            .map_err(|e| decode_err(format!("caps: {e}")))?,
        usage: serde_json::from_str::<HashMap<String, i64>>(&usage)
            .map_err(|e| decode_err(format!("usage: {e}")))?,
        suspended_at: suspended_at
            .map(|t| {
                chrono::DateTime::parse_from_rfc3339(&t)
                    .map(|t| t.with_timezone(&chrono::Utc))
                    .map_err(|e| decode_err(format!("suspended_at: {e}")))
            })
            .transpose()?,
        suspension_reason: reason
            .map(|r| {
                SuspensionReason::parse(&r)
                    .ok_or_else(|| decode_err(format!("unknown reason {r:?}")))
            })
            .transpose()?,
        project_id,
    })
}

/// Persist a full state snapshot back to the row.
pub fn update_project(conn: &Connection, state: &ProjectEnforcementState) -> AegisResult<()> {
    let caps = serde_json::to_string(&state.caps)?;
    let usage = serde_json::to_string(&state.usage)?;
    let updated = conn
        .execute(
            "UPDATE projects
             SET status = ?2, caps = ?3, usage = ?4, suspended_at = ?5, suspension_reason = ?6
             WHERE project_id = ?1",
            params![
                state.project_id,
                state.status.as_str(),
                caps,
                usage,
                state.suspended_at.map(|t| t.to_rfc3339()),
                state.suspension_reason.map(|r| r.as_str()),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if updated == 0 {
        return Err(AegisError::Enforcement(
            aegis_core::errors::EnforcementError::NotFound {
                project_id: state.project_id.clone(),
            },
        ));
    }
    Ok(())
}

/// All projects currently in ACTIVE status (the scan population).
pub fn active_project_ids(conn: &Connection) -> AegisResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT project_id FROM projects WHERE status = 'active' ORDER BY project_id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Resource names become `'$.' || name` JSON paths inside the quota SQL,
/// so a `.` or `"` in the name would silently address the wrong key.
/// Restricted to identifier characters before any path is built.
fn resource_path(resource: &str) -> AegisResult<String> {
    let valid = !resource.is_empty()
        && resource
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(AegisError::Enforcement(
            aegis_core::errors::EnforcementError::Validation {
                message: format!(
                    "resource name {resource:?} must be non-empty alphanumeric/underscore/hyphen"
                ),
            },
        ));
    }
    Ok(format!("$.{resource}"))
}

/// Outcome of [`try_consume`]: whether the increment was applied, and how
/// much headroom remains for the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeOutcome {
    pub applied: bool,
    pub remaining: i64,
}

/// Atomically add `requested` to a project's usage counter, but only when
/// the result stays within the cap and the project is active. A single
/// conditional UPDATE; concurrent callers can never over-consume via a
/// read-then-write race. An uncapped resource always admits.
pub fn try_consume(
    conn: &Connection,
    project_id: &str,
    resource: &str,
    requested: i64,
) -> AegisResult<ConsumeOutcome> {
    let path = resource_path(resource)?;
    let updated = conn
        .execute(
            "UPDATE projects
             SET usage = json_set(usage, ?2, COALESCE(json_extract(usage, ?2), 0) + ?3)
             WHERE project_id = ?1
               AND status = 'active'
               AND (
                   json_extract(caps, ?2) IS NULL
                   OR COALESCE(json_extract(usage, ?2), 0) + ?3 <= json_extract(caps, ?2)
               )",
            params![project_id, path, requested],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let remaining = remaining_quota(conn, project_id, resource)?;
    Ok(ConsumeOutcome {
        applied: updated > 0,
        remaining,
    })
}

/// Cap minus usage for one resource. `i64::MAX` when uncapped.
pub fn remaining_quota(conn: &Connection, project_id: &str, resource: &str) -> AegisResult<i64> {
    let path = resource_path(resource)?;
    let row = conn
        .query_row(
            "SELECT json_extract(caps, ?2), COALESCE(json_extract(usage, ?2), 0)
             FROM projects WHERE project_id = ?1",
            params![project_id, path],
            |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?,
                    row.get::<_, i64>(1)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match row {
        Some((Some(cap), used)) => Ok((cap - used).max(0)),
        Some((None, _)) => Ok(i64::MAX),
        None => Err(AegisError::Enforcement(
            aegis_core::errors::EnforcementError::NotFound {
                project_id: project_id.to_string(),
            },
        )),
    }
}
