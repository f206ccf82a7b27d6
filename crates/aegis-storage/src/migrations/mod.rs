//! Ordered schema migrations. Each `vNNN` module owns one version; applied
//! versions are tracked in `schema_version`.

mod v001_core_tables;
mod v002_metric_tables;
mod v003_rate_limit_tables;
mod v004_audit_tables;
mod v005_notification_tables;

use rusqlite::Connection;

use aegis_core::errors::{AegisError, AegisResult, StorageError};

use crate::to_storage_err;

/// All migrations in application order.
const MIGRATIONS: &[(u32, fn(&Connection) -> AegisResult<()>)] = &[
    (1, v001_core_tables::migrate),
    (2, v002_metric_tables::migrate),
    (3, v003_rate_limit_tables::migrate),
    (4, v004_audit_tables::migrate),
    (5, v005_notification_tables::migrate),
];

/// Run any pending migrations. Idempotent; safe to call at every startup.
pub fn run_migrations(conn: &Connection) -> AegisResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| {
            AegisError::Storage(StorageError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })
        })?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [*version],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tracing::info!(version, "applied schema migration");
    }
    Ok(())
}

/// Highest applied schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> AegisResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
