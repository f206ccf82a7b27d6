//! Quota manager error classification and consumption accounting.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use aegis_core::errors::{AegisError, EnforcementError};
use aegis_core::models::{Actor, SuspensionReason};
use aegis_enforcement::{QuotaManager, SuspensionManager};
use aegis_storage::StorageEngine;

fn setup(caps: &[(&str, i64)]) -> (Arc<StorageEngine>, QuotaManager) {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let caps: HashMap<String, i64> = caps
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    engine.provision_project("proj-a", caps).unwrap();
    let quota = QuotaManager::new(Arc::clone(&engine));
    (engine, quota)
}

#[test]
fn test_consume_within_cap_updates_remaining() {
    let (_engine, quota) = setup(&[("storage", 100)]);

    quota.enforce_cap("proj-a", "storage", 30).unwrap();
    quota.enforce_cap("proj-a", "storage", 30).unwrap();

    let check = quota.check_quota("proj-a", "storage").unwrap();
    assert!(check.allowed);
    assert_eq!(check.remaining, 40);
}

#[test]
fn test_over_cap_refused_without_partial_consumption() {
    let (_engine, quota) = setup(&[("storage", 100)]);
    quota.enforce_cap("proj-a", "storage", 90).unwrap();

    let err = quota.enforce_cap("proj-a", "storage", 20).unwrap_err();
    match err {
        AegisError::Enforcement(EnforcementError::QuotaExceeded {
            resource,
            requested,
            remaining,
        }) => {
            assert_eq!(resource, "storage");
            assert_eq!(requested, 20);
            assert_eq!(remaining, 10);
        }
        other => panic!("expected QuotaExceeded, got {other:?}"),
    }

    // The refused request consumed nothing.
    assert_eq!(quota.check_quota("proj-a", "storage").unwrap().remaining, 10);
}

#[test]
fn test_uncapped_resource_always_admits() {
    let (_engine, quota) = setup(&[("storage", 100)]);

    quota.enforce_cap("proj-a", "functions", 1_000_000).unwrap();
    let check = quota.check_quota("proj-a", "functions").unwrap();
    assert!(check.allowed);
    assert_eq!(check.remaining, i64::MAX);
}

#[test]
fn test_unknown_project_is_not_found() {
    let (_engine, quota) = setup(&[]);

    let err = quota.enforce_cap("ghost", "storage", 1).unwrap_err();
    assert!(matches!(
        err,
        AegisError::Enforcement(EnforcementError::NotFound { .. })
    ));
}

#[test]
fn test_suspended_project_refuses_consumption() {
    let (engine, quota) = setup(&[("storage", 100)]);
    SuspensionManager::new(Arc::clone(&engine))
        .suspend("proj-a", SuspensionReason::Manual, Actor::System)
        .unwrap();

    let err = quota.enforce_cap("proj-a", "storage", 1).unwrap_err();
    match err {
        AegisError::Enforcement(EnforcementError::ProjectSuspended { project_id }) => {
            assert_eq!(project_id, "proj-a");
        }
        other => panic!("expected ProjectSuspended, got {other:?}"),
    }
}

proptest! {
    /// Whatever sequence of requests arrives, accepted consumption never
    /// exceeds the cap and remaining headroom never goes negative.
    #[test]
    fn prop_accepted_consumption_never_exceeds_cap(
        cap in 1i64..500,
        requests in proptest::collection::vec(1i64..100, 1..30),
    ) {
        let (_engine, quota) = setup(&[("storage", cap)]);
        let mut consumed = 0i64;
        for requested in requests {
            if quota.enforce_cap("proj-a", "storage", requested).is_ok() {
                consumed += requested;
            }
        }
        prop_assert!(consumed <= cap);
        let check = quota.check_quota("proj-a", "storage").unwrap();
        prop_assert_eq!(check.remaining, cap - consumed);
    }
}

#[test]
fn test_resource_name_with_path_characters_rejected() {
    let (_engine, quota) = setup(&[("storage", 100), ("storage.hot", 5)]);

    // A dot or quote would otherwise address the wrong key inside the
    // caps/usage JSON.
    for resource in ["storage.hot", "storage\"", "$.storage", "a[0]", ""] {
        let err = quota.enforce_cap("proj-a", resource, 1).unwrap_err();
        assert!(
            matches!(
                err,
                AegisError::Enforcement(EnforcementError::Validation { .. })
            ),
            "{resource:?} should be rejected, got {err:?}"
        );
        let err = quota.check_quota("proj-a", resource).unwrap_err();
        assert!(matches!(
            err,
            AegisError::Enforcement(EnforcementError::Validation { .. })
        ));
    }

    // Identifier names, hyphens included, still work.
    quota.enforce_cap("proj-a", "storage", 1).unwrap();
    quota.enforce_cap("proj-a", "api-calls_v2", 1).unwrap();
    assert_eq!(quota.check_quota("proj-a", "storage").unwrap().remaining, 99);
}

#[test]
fn test_non_positive_request_rejected() {
    let (_engine, quota) = setup(&[("storage", 100)]);

    for requested in [0, -5] {
        let err = quota.enforce_cap("proj-a", "storage", requested).unwrap_err();
        assert!(matches!(
            err,
            AegisError::Enforcement(EnforcementError::Validation { .. })
        ));
    }
}
