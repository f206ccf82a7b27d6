//! The single write connection. Serializes all mutations.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use aegis_core::errors::AegisResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// Exclusive write connection behind a mutex. Every mutation in the system
/// goes through [`with_conn_sync`](Self::with_conn_sync), which is what
/// gives per-project transitions their linearization.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open the write connection for the given database file.
    pub fn open(path: &Path) -> AegisResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory write connection (for testing).
    pub fn open_in_memory() -> AegisResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure holding the write connection.
    pub fn with_conn_sync<F, T>(&self, f: F) -> AegisResult<T>
    where
        F: FnOnce(&Connection) -> AegisResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write connection lock poisoned: {e}")))?;
        f(&guard)
    }
}
