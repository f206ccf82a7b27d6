//! Operator override path: authorization, rate limiting, validation,
//! atomic application, history.

use std::collections::HashMap;
use std::sync::Arc;

use aegis_core::config::RateLimitConfig;
use aegis_core::errors::{AegisError, EnforcementError};
use aegis_core::models::{
    Actor, OperatorContext, OperatorRole, OverrideAction, OverrideRequest, ProjectStatus,
    SuspensionReason,
};
use aegis_enforcement::{OverrideManager, RateLimiter, SuspensionManager};
use aegis_storage::queries::{audit_ops, suspension_ops};
use aegis_storage::StorageEngine;

fn setup() -> (Arc<StorageEngine>, OverrideManager, SuspensionManager) {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    engine
        .provision_project("proj-a", HashMap::from([("storage".to_string(), 100)]))
        .unwrap();
    let rate_limiter = RateLimiter::new(Arc::clone(&engine), RateLimitConfig::default());
    let manager = OverrideManager::new(Arc::clone(&engine), rate_limiter);
    let suspensions = SuspensionManager::new(Arc::clone(&engine));
    (engine, manager, suspensions)
}

fn operator(id: &str, role: OperatorRole) -> OperatorContext {
    OperatorContext {
        operator_id: id.to_string(),
        role,
        client_ip: "203.0.113.7".to_string(),
    }
}

fn request(action: OverrideAction, new_caps: Option<HashMap<String, i64>>) -> OverrideRequest {
    OverrideRequest {
        project_id: "proj-a".to_string(),
        action,
        reason: "customer escalation".to_string(),
        new_caps,
        notes: Some("ticket OPS-1432".to_string()),
    }
}

#[test]
fn test_both_unsuspends_and_raises_caps_atomically() {
    let (engine, manager, suspensions) = setup();
    suspensions
        .suspend("proj-a", SuspensionReason::ErrorRate, Actor::System)
        .unwrap();

    let outcome = manager
        .perform_override(
            &request(
                OverrideAction::Both,
                Some(HashMap::from([("storage".to_string(), 500)])),
            ),
            &operator("op-1", OperatorRole::Operator),
        )
        .unwrap();

    // Snapshots bracket the change exactly.
    assert_eq!(outcome.previous_state.status, ProjectStatus::Suspended);
    assert_eq!(outcome.previous_state.caps["storage"], 100);
    assert_eq!(outcome.new_state.status, ProjectStatus::Active);
    assert_eq!(outcome.new_state.caps["storage"], 500);
    assert_eq!(outcome.record.performed_by, "op-1");

    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            assert!(suspension_ops::open_record(conn, "proj-a")?.is_none());
            let audit = audit_ops::query_by_action(conn, "override_performed")?;
            assert_eq!(audit.len(), 1);
            assert_eq!(audit[0].metadata["action"], "both");
            assert_eq!(audit[0].metadata["client_ip"], "203.0.113.7");
            Ok(())
        })
        .unwrap();

    let state = engine.project_state("proj-a").unwrap().unwrap();
    assert_eq!(state.status, ProjectStatus::Active);
    assert_eq!(state.caps["storage"], 500);
}

#[test]
fn test_unsuspend_on_active_project_still_records() {
    let (_engine, manager, _suspensions) = setup();

    let outcome = manager
        .perform_override(
            &request(OverrideAction::Unsuspend, None),
            &operator("op-1", OperatorRole::Admin),
        )
        .unwrap();

    // No state change, but the operator's intent is still on record.
    assert_eq!(outcome.previous_state.status, ProjectStatus::Active);
    assert_eq!(outcome.new_state.status, ProjectStatus::Active);

    let history = manager.list_overrides("proj-a", None).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, OverrideAction::Unsuspend);
}

#[test]
fn test_viewer_is_denied_and_audited() {
    let (engine, manager, _suspensions) = setup();

    let err = manager
        .perform_override(
            &request(OverrideAction::Unsuspend, None),
            &operator("viewer-1", OperatorRole::Viewer),
        )
        .unwrap_err();
    match err {
        AegisError::Enforcement(EnforcementError::Authorization { actor_id, attempted }) => {
            assert_eq!(actor_id, "viewer-1");
            assert_eq!(attempted, "perform_override");
        }
        other => panic!("expected Authorization, got {other:?}"),
    }

    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let denied = audit_ops::query_by_action(conn, "authorization_denied")?;
            assert_eq!(denied.len(), 1);
            assert_eq!(denied[0].actor_id, "viewer-1");
            Ok(())
        })
        .unwrap();
    assert!(manager.list_overrides("proj-a", None).unwrap().is_empty());
}

#[test]
fn test_eleventh_call_in_window_is_rate_limited() {
    let (_engine, manager, _suspensions) = setup();
    let op = operator("op-1", OperatorRole::Operator);

    for _ in 0..10 {
        manager
            .perform_override(&request(OverrideAction::Unsuspend, None), &op)
            .unwrap();
    }
    let err = manager
        .perform_override(&request(OverrideAction::Unsuspend, None), &op)
        .unwrap_err();
    match err {
        AegisError::Enforcement(EnforcementError::RateLimited { reset_at }) => {
            assert!(reset_at > chrono::Utc::now());
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }

    // A different operator is not affected.
    manager
        .perform_override(
            &request(OverrideAction::Unsuspend, None),
            &operator("op-2", OperatorRole::Operator),
        )
        .unwrap();
}

#[test]
fn test_validation_rejections() {
    let (_engine, manager, _suspensions) = setup();
    let op = operator("op-1", OperatorRole::Operator);

    let cases: Vec<OverrideRequest> = vec![
        // Empty reason.
        OverrideRequest {
            reason: "   ".to_string(),
            ..request(OverrideAction::Unsuspend, None)
        },
        // Cap-raising action without caps.
        request(OverrideAction::IncreaseCaps, None),
        // Empty caps map.
        request(OverrideAction::Both, Some(HashMap::new())),
        // Non-positive cap.
        request(
            OverrideAction::IncreaseCaps,
            Some(HashMap::from([("storage".to_string(), 0)])),
        ),
        // Caps supplied with a non-cap action.
        request(
            OverrideAction::Unsuspend,
            Some(HashMap::from([("storage".to_string(), 500)])),
        ),
    ];
    for case in cases {
        let err = manager.perform_override(&case, &op).unwrap_err();
        assert!(
            matches!(
                err,
                AegisError::Enforcement(EnforcementError::Validation { .. })
            ),
            "case {:?} produced {err:?}",
            case.action
        );
    }
    assert!(manager.list_overrides("proj-a", None).unwrap().is_empty());
}

#[test]
fn test_cap_decrease_and_new_resource_rejected() {
    let (engine, manager, _suspensions) = setup();
    let op = operator("op-1", OperatorRole::Operator);

    for caps in [
        // Decrease of an existing cap.
        HashMap::from([("storage".to_string(), 50)]),
        // Cap introduced for an uncapped resource.
        HashMap::from([("functions".to_string(), 10)]),
    ] {
        let err = manager
            .perform_override(&request(OverrideAction::IncreaseCaps, Some(caps)), &op)
            .unwrap_err();
        assert!(matches!(
            err,
            AegisError::Enforcement(EnforcementError::Validation { .. })
        ));
    }

    let state = engine.project_state("proj-a").unwrap().unwrap();
    assert_eq!(state.caps["storage"], 100);
    assert!(!state.caps.contains_key("functions"));
}

#[test]
fn test_failed_override_leaves_no_partial_state() {
    let (engine, manager, suspensions) = setup();
    suspensions
        .suspend("proj-a", SuspensionReason::Spike, Actor::System)
        .unwrap();

    // Breaking the audit table makes the last step of the transaction
    // fail, after the state update and record insert have run.
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            conn.execute_batch("DROP TABLE audit_logs")
                .map_err(|e| AegisError::Internal(e.to_string()))
        })
        .unwrap();

    let err = manager.perform_override(
        &request(
            OverrideAction::Both,
            Some(HashMap::from([("storage".to_string(), 500)])),
        ),
        &operator("op-1", OperatorRole::Operator),
    );
    assert!(err.is_err());

    // Rollback left the suspension and caps untouched, and no record.
    let state = engine.project_state("proj-a").unwrap().unwrap();
    assert_eq!(state.status, ProjectStatus::Suspended);
    assert_eq!(state.caps["storage"], 100);
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            assert!(suspension_ops::open_record(conn, "proj-a")?.is_some());
            Ok(())
        })
        .unwrap();
    assert!(manager.list_overrides("proj-a", None).unwrap().is_empty());
}
