//! Retention pruning and housekeeping.

use std::collections::HashMap;

use chrono::{Duration, Utc};

use aegis_core::constants::METRIC_RETENTION_DAYS;
use aegis_core::models::MetricSample;
use aegis_core::traits::IMetricsSource;
use aegis_storage::queries::metric_ops;
use aegis_storage::StorageEngine;

#[test]
fn test_maintenance_prunes_only_past_the_horizon() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.provision_project("proj-a", HashMap::new()).unwrap();

    let now = Utc::now();
    let stale = now - Duration::days(METRIC_RETENTION_DAYS as i64 + 10);
    for (recorded_at, requests) in [(stale, 500), (now - Duration::hours(1), 700)] {
        engine
            .record_sample(&MetricSample {
                project_id: "proj-a".to_string(),
                request_count: requests,
                error_count: 0,
                recorded_at,
            })
            .unwrap();
    }
    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            metric_ops::insert_flagged_access(conn, "proj-a", "table_scan", stale)?;
            metric_ops::insert_flagged_access(conn, "proj-a", "table_scan", now)?;
            Ok(())
        })
        .unwrap();

    let report = engine.run_maintenance(METRIC_RETENTION_DAYS).unwrap();
    assert_eq!(report.metric_samples_pruned, 1);
    assert_eq!(report.flagged_accesses_pruned, 1);
    assert!(report.integrity_ok);

    // The recent rows survive.
    let window = engine
        .metric_window("proj-a", now - Duration::days(2), now + Duration::hours(1))
        .unwrap();
    assert_eq!(window.total_requests, 700);
    assert_eq!(window.sample_count, 1);

    // A second pass finds nothing left to prune.
    let report = engine.run_maintenance(METRIC_RETENTION_DAYS).unwrap();
    assert_eq!(report.metric_samples_pruned, 0);
    assert_eq!(report.flagged_accesses_pruned, 0);
}
