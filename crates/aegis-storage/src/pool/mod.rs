//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::Path;

use aegis_core::errors::AegisResult;

pub use read_pool::{ReadPool, DEFAULT_READERS};
pub use write_connection::WriteConnection;

/// The single write connection plus, for file-backed databases, a pool of
/// readers.
///
/// All mutations funnel through the writer, which linearizes per-project
/// read-modify-write transitions; WAL keeps the readers unblocked. An
/// in-memory pool has no readers (separate in-memory connections would be
/// isolated databases) and serves reads from the writer.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    readers: Option<ReadPool>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, read_pool_size: usize) -> AegisResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self {
            writer,
            readers: Some(readers),
        })
    }

    /// Open an in-memory connection pool (for testing).
    pub fn open_in_memory() -> AegisResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        Ok(Self {
            writer,
            readers: None,
        })
    }

    /// Run a read-only query on the best available connection: a pool
    /// reader when one exists, the writer otherwise.
    pub fn with_reader<F, T>(&self, f: F) -> AegisResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> AegisResult<T>,
    {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            None => self.writer.with_conn_sync(f),
        }
    }

    /// Number of pooled readers, zero for in-memory pools.
    pub fn reader_count(&self) -> usize {
        self.readers.as_ref().map_or(0, ReadPool::size)
    }
}
