//! v001: projects, suspensions, overrides.

use rusqlite::Connection;

use aegis_core::errors::AegisResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AegisResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS projects (
            project_id        TEXT PRIMARY KEY,
            status            TEXT NOT NULL DEFAULT 'active',
            caps              TEXT NOT NULL DEFAULT '{}',
            usage             TEXT NOT NULL DEFAULT '{}',
            suspended_at      TEXT,
            suspension_reason TEXT
        );

        CREATE TABLE IF NOT EXISTS suspensions (
            id           TEXT PRIMARY KEY,
            project_id   TEXT NOT NULL REFERENCES projects(project_id),
            reason       TEXT NOT NULL,
            triggered_by TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            resolved_at  TEXT
        );

        -- At most one open suspension per project.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_suspensions_open
            ON suspensions(project_id) WHERE resolved_at IS NULL;
        CREATE INDEX IF NOT EXISTS idx_suspensions_project ON suspensions(project_id);

        CREATE TABLE IF NOT EXISTS overrides (
            id             TEXT PRIMARY KEY,
            project_id     TEXT NOT NULL REFERENCES projects(project_id),
            action         TEXT NOT NULL,
            reason         TEXT NOT NULL,
            notes          TEXT,
            performed_by   TEXT NOT NULL,
            performed_at   TEXT NOT NULL,
            previous_state TEXT NOT NULL,
            new_state      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_overrides_project
            ON overrides(project_id, performed_at DESC);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
