//! Audit log append and forensic query paths.

use serde_json::json;

use aegis_core::models::{Actor, ActorType};
use aegis_storage::audit::AuditLogger;
use aegis_storage::queries::audit_ops;
use aegis_storage::StorageEngine;

#[test]
fn test_enforcement_entries_queryable_by_project() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            AuditLogger::log_enforcement(
                conn,
                &Actor::System,
                "project_suspended",
                "project",
                "proj-a",
                "proj-a",
                json!({ "reason": "error_rate" }),
            )?;
            AuditLogger::log_enforcement(
                conn,
                &Actor::User("op-1".to_string()),
                "project_unsuspended",
                "project",
                "proj-a",
                "proj-a",
                json!({}),
            )?;
            AuditLogger::log_enforcement(
                conn,
                &Actor::System,
                "project_suspended",
                "project",
                "proj-b",
                "proj-b",
                json!({}),
            )?;

            let entries = audit_ops::query_by_project(conn, "proj-a")?;
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].action, "project_suspended");
            assert_eq!(entries[0].actor_type, ActorType::System);
            assert_eq!(entries[0].metadata["reason"], "error_rate");
            assert_eq!(entries[1].action, "project_unsuspended");
            assert_eq!(entries[1].actor_id, "op-1");
            assert_eq!(entries[1].actor_type, ActorType::User);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_query_by_action_spans_projects() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            for project in ["proj-a", "proj-b", "proj-c"] {
                AuditLogger::log_enforcement(
                    conn,
                    &Actor::System,
                    "project_suspended",
                    "project",
                    project,
                    project,
                    json!({}),
                )?;
            }
            AuditLogger::log_enforcement(
                conn,
                &Actor::System,
                "project_unsuspended",
                "project",
                "proj-a",
                "proj-a",
                json!({}),
            )?;

            let suspended = audit_ops::query_by_action(conn, "project_suspended")?;
            assert_eq!(suspended.len(), 3);
            let unsuspended = audit_ops::query_by_action(conn, "project_unsuspended")?;
            assert_eq!(unsuspended.len(), 1);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_denied_attempt_is_recorded() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            AuditLogger::log_denied(conn, "viewer-1", "perform_override", Some("proj-a"))?;

            let denied = audit_ops::query_by_action(conn, "authorization_denied")?;
            assert_eq!(denied.len(), 1);
            assert_eq!(denied[0].actor_id, "viewer-1");
            assert_eq!(denied[0].target_id, "perform_override");
            assert_eq!(denied[0].project_id.as_deref(), Some("proj-a"));
            assert_eq!(denied[0].metadata["attempted"], "perform_override");
            Ok(())
        })
        .unwrap();
}
