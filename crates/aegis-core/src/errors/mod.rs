//! Workspace error taxonomy. Per-layer enums aggregated into [`AegisError`].
//!
//! Every variant carries structured fields; nothing anywhere discriminates
//! on message text.

pub mod detection_error;
pub mod enforcement_error;
pub mod notify_error;
pub mod storage_error;

pub use detection_error::DetectionError;
pub use enforcement_error::EnforcementError;
pub use notify_error::NotifyError;
pub use storage_error::StorageError;

/// Top-level error for the Aegis workspace.
#[derive(Debug, thiserror::Error)]
pub enum AegisError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Enforcement(#[from] EnforcementError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    /// Persistence or transaction failure surfaced to a caller. Always
    /// rolled back, never partially committed.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used across the workspace.
pub type AegisResult<T> = Result<T, AegisError>;

impl AegisError {
    /// Stable machine-readable code for API error objects.
    pub fn code(&self) -> &'static str {
        match self {
            AegisError::Storage(_) | AegisError::Internal(_) => "internal_error",
            AegisError::Enforcement(e) => e.code(),
            AegisError::Detection(_) => "detection_failure",
            AegisError::Notify(_) => "notification_failure",
            AegisError::Serialization(_) => "internal_error",
            AegisError::Config(_) => "config_error",
        }
    }
}
