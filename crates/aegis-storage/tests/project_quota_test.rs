//! Project state CRUD and the atomic usage increment.

use std::collections::HashMap;

use aegis_core::models::ProjectStatus;
use aegis_storage::queries::project_ops;
use aegis_storage::StorageEngine;

fn engine_with_project(caps: &[(&str, i64)]) -> StorageEngine {
    let engine = StorageEngine::open_in_memory().unwrap();
    let caps: HashMap<String, i64> = caps
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    engine.provision_project("proj-1", caps).unwrap();
    engine
}

#[test]
fn test_provision_and_get_roundtrip() {
    let engine = engine_with_project(&[("storage", 100)]);
    let state = engine.project_state("proj-1").unwrap().unwrap();
    assert_eq!(state.project_id, "proj-1");
    assert_eq!(state.status, ProjectStatus::Active);
    assert_eq!(state.caps.get("storage"), Some(&100));
    assert!(engine.project_state("missing").unwrap().is_none());
}

#[test]
fn test_consume_within_cap() {
    let engine = engine_with_project(&[("storage", 100)]);
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let outcome = project_ops::try_consume(conn, "proj-1", "storage", 60)?;
            assert!(outcome.applied);
            assert_eq!(outcome.remaining, 40);

            let outcome = project_ops::try_consume(conn, "proj-1", "storage", 40)?;
            assert!(outcome.applied);
            assert_eq!(outcome.remaining, 0);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_consume_over_cap_is_refused_without_partial_effect() {
    let engine = engine_with_project(&[("storage", 100)]);
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let outcome = project_ops::try_consume(conn, "proj-1", "storage", 101)?;
            assert!(!outcome.applied);
            // Usage untouched by the refused attempt.
            assert_eq!(project_ops::remaining_quota(conn, "proj-1", "storage")?, 100);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_uncapped_resource_always_admits() {
    let engine = engine_with_project(&[("storage", 100)]);
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let outcome = project_ops::try_consume(conn, "proj-1", "invocations", 1_000_000)?;
            assert!(outcome.applied);
            assert_eq!(
                project_ops::remaining_quota(conn, "proj-1", "invocations")?,
                i64::MAX
            );
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_suspended_project_refuses_consumption() {
    let engine = engine_with_project(&[("storage", 100)]);
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let mut state = project_ops::get_project(conn, "proj-1")?.unwrap();
            state.status = ProjectStatus::Suspended;
            project_ops::update_project(conn, &state)?;

            let outcome = project_ops::try_consume(conn, "proj-1", "storage", 1)?;
            assert!(!outcome.applied);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_active_project_ids_filters_status() {
    let engine = engine_with_project(&[]);
    engine.provision_project("proj-2", HashMap::new()).unwrap();
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let mut state = project_ops::get_project(conn, "proj-2")?.unwrap();
            state.status = ProjectStatus::Suspended;
            project_ops::update_project(conn, &state)?;

            let active = project_ops::active_project_ids(conn)?;
            assert_eq!(active, vec!["proj-1".to_string()]);
            Ok(())
        })
        .unwrap();
}
