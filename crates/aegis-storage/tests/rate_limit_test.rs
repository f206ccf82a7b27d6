//! Window counter semantics: quota bound, window rollover, pruning.

use chrono::{Duration, Utc};
use proptest::prelude::*;

use aegis_core::models::IdentifierType;
use aegis_storage::queries::rate_limit_ops;
use aegis_storage::StorageEngine;

const WINDOW_SECS: u64 = 3_600;

#[test]
fn test_quota_bound_within_window() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            for attempt in 1i64..=10 {
                let decision = rate_limit_ops::check_and_increment(
                    conn,
                    IdentifierType::Org,
                    "op-1",
                    10,
                    WINDOW_SECS,
                    now,
                )?;
                assert!(decision.allowed, "attempt {attempt} should be allowed");
                assert_eq!(decision.attempt_count, attempt);
            }
            let eleventh = rate_limit_ops::check_and_increment(
                conn,
                IdentifierType::Org,
                "op-1",
                10,
                WINDOW_SECS,
                now,
            )?;
            assert!(!eleventh.allowed);
            assert_eq!(eleventh.attempt_count, 11);
            assert!(eleventh.reset_at > now);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_identifiers_do_not_share_windows() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            for _ in 0..5 {
                rate_limit_ops::check_and_increment(
                    conn,
                    IdentifierType::Org,
                    "op-1",
                    10,
                    WINDOW_SECS,
                    now,
                )?;
            }
            let other = rate_limit_ops::check_and_increment(
                conn,
                IdentifierType::Org,
                "op-2",
                10,
                WINDOW_SECS,
                now,
            )?;
            assert_eq!(other.attempt_count, 1);

            // Same value under a different identifier type is a separate key.
            let ip = rate_limit_ops::check_and_increment(
                conn,
                IdentifierType::Ip,
                "op-1",
                10,
                WINDOW_SECS,
                now,
            )?;
            assert_eq!(ip.attempt_count, 1);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_new_window_resets_count() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    let later = now + Duration::seconds(WINDOW_SECS as i64);
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            for _ in 0..10 {
                rate_limit_ops::check_and_increment(
                    conn,
                    IdentifierType::Org,
                    "op-1",
                    10,
                    WINDOW_SECS,
                    now,
                )?;
            }
            let next_window = rate_limit_ops::check_and_increment(
                conn,
                IdentifierType::Org,
                "op-1",
                10,
                WINDOW_SECS,
                later,
            )?;
            assert!(next_window.allowed);
            assert_eq!(next_window.attempt_count, 1);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_prune_expired_windows() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let now = Utc::now();
    let old = now - Duration::seconds(2 * WINDOW_SECS as i64);
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            rate_limit_ops::check_and_increment(
                conn,
                IdentifierType::Org,
                "op-1",
                10,
                WINDOW_SECS,
                old,
            )?;
            rate_limit_ops::check_and_increment(
                conn,
                IdentifierType::Org,
                "op-1",
                10,
                WINDOW_SECS,
                now,
            )?;
            let pruned = rate_limit_ops::prune_expired(conn, WINDOW_SECS, now)?;
            assert_eq!(pruned, 1);
            Ok(())
        })
        .unwrap();
}

proptest! {
    /// However many attempts arrive in one window, the number admitted
    /// never exceeds the quota.
    #[test]
    fn prop_never_admits_more_than_quota(attempts in 1usize..40, quota in 1i64..20) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let now = Utc::now();
        let admitted = engine
            .pool()
            .writer
            .with_conn_sync(|conn| {
                let mut admitted = 0usize;
                for _ in 0..attempts {
                    let decision = rate_limit_ops::check_and_increment(
                        conn,
                        IdentifierType::Org,
                        "op-prop",
                        quota,
                        WINDOW_SECS,
                        now,
                    )?;
                    if decision.allowed {
                        admitted += 1;
                    }
                }
                Ok(admitted)
            })
            .unwrap();
        prop_assert!(admitted as i64 <= quota);
    }
}
