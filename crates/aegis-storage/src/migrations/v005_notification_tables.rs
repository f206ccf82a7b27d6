//! v005: notifications delivery queue.

use rusqlite::Connection;

use aegis_core::errors::AegisResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AegisResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS notifications (
            id            TEXT PRIMARY KEY,
            project_id    TEXT NOT NULL,
            channel       TEXT NOT NULL,
            recipient     TEXT NOT NULL,
            subject       TEXT NOT NULL,
            body          TEXT NOT NULL,
            status        TEXT NOT NULL DEFAULT 'pending',
            attempt_count INTEGER NOT NULL DEFAULT 0,
            last_error    TEXT,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_status ON notifications(status);
        CREATE INDEX IF NOT EXISTS idx_notifications_project ON notifications(project_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
