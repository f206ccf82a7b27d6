//! StorageEngine — owns the ConnectionPool, runs migrations at startup,
//! implements the core trait seams.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use aegis_core::errors::AegisResult;
use aegis_core::models::{DetectionResult, MetricSample, MetricWindow, ProjectEnforcementState};
use aegis_core::traits::IMetricsSource;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries;

/// The main storage engine. Owns the connection pool and fronts the query
/// modules for the rest of the workspace.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> AegisResult<Self> {
        let pool = ConnectionPool::open(path, crate::pool::DEFAULT_READERS)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> AegisResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Run migrations on the write connection.
    fn initialize(&self) -> AegisResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| migrations::run_migrations(conn))
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute a read-only query on the best available connection.
    pub fn with_reader<F, T>(&self, f: F) -> AegisResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> AegisResult<T>,
    {
        self.pool.with_reader(f)
    }

    // --- Project lifecycle ---

    /// Create a project's enforcement state at provisioning time.
    pub fn provision_project(
        &self,
        project_id: &str,
        caps: HashMap<String, i64>,
    ) -> AegisResult<ProjectEnforcementState> {
        let state = ProjectEnforcementState::provisioned(project_id, caps);
        self.pool
            .writer
            .with_conn_sync(|conn| queries::project_ops::insert_project(conn, &state))?;
        Ok(state)
    }

    /// Current enforcement state for a project.
    pub fn project_state(&self, project_id: &str) -> AegisResult<Option<ProjectEnforcementState>> {
        self.with_reader(|conn| queries::project_ops::get_project(conn, project_id))
    }

    // --- Metric ingestion (called by the request-logging collaborator) ---

    /// Append one metric sample.
    pub fn record_sample(&self, sample: &MetricSample) -> AegisResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| queries::metric_ops::insert_sample(conn, sample))
    }

    /// Record one flagged access-pattern event.
    pub fn record_flagged_access(&self, project_id: &str, pattern: &str) -> AegisResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            queries::metric_ops::insert_flagged_access(conn, project_id, pattern, Utc::now())
        })
    }

    // --- Detection history ---

    /// Persist a detection result.
    pub fn record_detection(&self, result: &DetectionResult) -> AegisResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| queries::detection_ops::insert_result(conn, result))
    }

    /// Detection history for a project, newest first.
    pub fn detection_history(
        &self,
        project_id: &str,
        limit: usize,
    ) -> AegisResult<Vec<DetectionResult>> {
        self.with_reader(|conn| queries::detection_ops::history(conn, project_id, limit))
    }

    // --- Retention & housekeeping ---

    /// Prune metric rows past the retention horizon, checkpoint the WAL,
    /// and verify integrity. Run from a periodic scheduler tick.
    pub fn run_maintenance(&self, retention_days: u64) -> AegisResult<MaintenanceReport> {
        let report = self.pool.writer.with_conn_sync(|conn| {
            let metric_samples_pruned =
                queries::maintenance::prune_metric_samples(conn, retention_days)?;
            let flagged_accesses_pruned =
                queries::maintenance::prune_flagged_accesses(conn, retention_days)?;
            queries::maintenance::wal_checkpoint(conn)?;
            let integrity_ok = queries::maintenance::integrity_check(conn)?;
            Ok(MaintenanceReport {
                metric_samples_pruned,
                flagged_accesses_pruned,
                integrity_ok,
            })
        })?;
        tracing::info!(
            metric_samples_pruned = report.metric_samples_pruned,
            flagged_accesses_pruned = report.flagged_accesses_pruned,
            integrity_ok = report.integrity_ok,
            "storage maintenance complete"
        );
        Ok(report)
    }
}

/// Outcome of one maintenance pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenanceReport {
    pub metric_samples_pruned: usize,
    pub flagged_accesses_pruned: usize,
    pub integrity_ok: bool,
}

impl IMetricsSource for StorageEngine {
    fn active_project_ids(&self) -> AegisResult<Vec<String>> {
        self.with_reader(queries::project_ops::active_project_ids)
    }

    fn metric_window(
        &self,
        project_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AegisResult<MetricWindow> {
        self.with_reader(|conn| queries::metric_ops::metric_window(conn, project_id, from, to))
    }

    fn flagged_access_count(
        &self,
        project_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AegisResult<i64> {
        self.with_reader(|conn| {
            queries::metric_ops::flagged_access_count(conn, project_id, from, to)
        })
    }
}
