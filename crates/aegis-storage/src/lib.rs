//! # aegis-storage
//!
//! SQLite persistence for the abuse control plane: single-writer connection
//! pool (WAL), ordered schema migrations, query modules, and the
//! append-only audit logger. The [`StorageEngine`] facade ties them
//! together and implements the core trait seams.

pub mod audit;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use audit::AuditLogger;
pub use engine::{MaintenanceReport, StorageEngine};

use aegis_core::errors::{AegisError, StorageError};

/// Wrap a low-level SQLite failure into the storage error taxonomy.
pub(crate) fn to_storage_err(message: impl Into<String>) -> AegisError {
    AegisError::Storage(StorageError::SqliteError {
        message: message.into(),
    })
}
