//! Append-only audit logger. Static helpers over the `audit_logs` table.

use chrono::Utc;
use rusqlite::Connection;

use aegis_core::errors::AegisResult;
use aegis_core::models::{Actor, AuditLogEntry};

use crate::queries::audit_ops;

/// Thin facade over [`audit_ops`]: builds well-formed entries for the
/// common shapes so callers never assemble rows by hand.
pub struct AuditLogger;

impl AuditLogger {
    /// Append a fully formed entry.
    pub fn log(conn: &Connection, entry: &AuditLogEntry) -> AegisResult<()> {
        audit_ops::insert_entry(conn, entry)
    }

    /// A system- or operator-driven enforcement action against a project.
    pub fn log_enforcement(
        conn: &Connection,
        actor: &Actor,
        action: &str,
        target_type: &str,
        target_id: &str,
        project_id: &str,
        metadata: serde_json::Value,
    ) -> AegisResult<()> {
        audit_ops::insert_entry(
            conn,
            &AuditLogEntry {
                actor_id: actor.actor_id().to_string(),
                actor_type: actor.actor_type(),
                action: action.to_string(),
                target_type: target_type.to_string(),
                target_id: target_id.to_string(),
                project_id: Some(project_id.to_string()),
                metadata,
                created_at: Utc::now(),
            },
        )
    }

    /// A denied authorization attempt. Written before the error is
    /// returned to the caller, to support forensic review.
    pub fn log_denied(
        conn: &Connection,
        actor_id: &str,
        attempted: &str,
        project_id: Option<&str>,
    ) -> AegisResult<()> {
        audit_ops::insert_entry(
            conn,
            &AuditLogEntry {
                actor_id: actor_id.to_string(),
                actor_type: aegis_core::models::ActorType::User,
                action: "authorization_denied".to_string(),
                target_type: "override".to_string(),
                target_id: attempted.to_string(),
                project_id: project_id.map(str::to_string),
                metadata: serde_json::json!({ "attempted": attempted }),
                created_at: Utc::now(),
            },
        )
    }
}
