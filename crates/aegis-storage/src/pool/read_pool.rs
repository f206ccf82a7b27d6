//! Round-robin pool of read-only connections.
//!
//! Only file-backed pools carry one. In-memory engines have no read pool
//! at all: separate in-memory connections are isolated databases, so the
//! [`ConnectionPool`](super::ConnectionPool) routes those reads through
//! the writer instead.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use aegis_core::errors::AegisResult;

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

/// Read connections opened when the caller does not say otherwise.
pub const DEFAULT_READERS: usize = 4;

const MAX_READERS: usize = 8;

/// Read-only connections handed out round-robin. Under WAL the writer
/// never blocks them.
pub struct ReadPool {
    readers: Box<[Mutex<Connection>]>,
    cursor: AtomicUsize,
}

impl ReadPool {
    /// Open `size` read-only connections to the database file, clamped
    /// to `1..=8`.
    pub fn open(path: &Path, size: usize) -> AegisResult<Self> {
        let readers = (0..size.clamp(1, MAX_READERS))
            .map(|_| {
                let conn = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )
                .map_err(|e| to_storage_err(e.to_string()))?;
                apply_read_pragmas(&conn)?;
                Ok(Mutex::new(conn))
            })
            .collect::<AegisResult<Vec<_>>>()?;
        Ok(Self {
            readers: readers.into_boxed_slice(),
            cursor: AtomicUsize::new(0),
        })
    }

    /// Run `f` on the next reader in rotation.
    pub fn with_conn<F, T>(&self, f: F) -> AegisResult<T>
    where
        F: FnOnce(&Connection) -> AegisResult<T>,
    {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| to_storage_err(format!("reader lock poisoned: {e}")))?;
        f(&conn)
    }

    pub fn size(&self) -> usize {
        self.readers.len()
    }
}
