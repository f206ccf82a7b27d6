//! v003: rate_limits.

use rusqlite::Connection;

use aegis_core::errors::AegisResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> AegisResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS rate_limits (
            identifier_type  TEXT NOT NULL,
            identifier_value TEXT NOT NULL,
            attempt_count    INTEGER NOT NULL DEFAULT 0,
            window_start     TEXT NOT NULL,
            UNIQUE(identifier_type, identifier_value, window_start)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
