use chrono::{DateTime, Utc};

/// Enforcement-layer errors: everything an operator-facing caller can see.
///
/// Each variant maps to a stable API code and a conventional HTTP status at
/// the (external) routing layer.
#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    /// Malformed request body. Always client-fixable.
    #[error("invalid request: {message}")]
    Validation { message: String },

    /// Missing or invalid credential.
    #[error("authentication required")]
    Authentication,

    /// Caller's role is insufficient. Carries the denied actor for audit.
    #[error("actor {actor_id} is not permitted to perform {attempted}")]
    Authorization { actor_id: String, attempted: String },

    #[error("project {project_id} not found")]
    NotFound { project_id: String },

    /// Retryable; `reset_at` is the client backoff hint.
    #[error("rate limited until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// Recoverable by the caller reducing usage. Not a system fault.
    #[error("quota exceeded for {resource}: requested {requested}, remaining {remaining}")]
    QuotaExceeded {
        resource: String,
        requested: i64,
        remaining: i64,
    },

    /// Further resource-consuming operations are blocked until an override.
    #[error("project {project_id} is suspended")]
    ProjectSuspended { project_id: String },
}

impl EnforcementError {
    pub fn code(&self) -> &'static str {
        match self {
            EnforcementError::Validation { .. } => "invalid_request",
            EnforcementError::Authentication => "unauthenticated",
            EnforcementError::Authorization { .. } => "forbidden",
            EnforcementError::NotFound { .. } => "not_found",
            EnforcementError::RateLimited { .. } => "rate_limited",
            EnforcementError::QuotaExceeded { .. } => "quota_exceeded",
            EnforcementError::ProjectSuspended { .. } => "project_suspended",
        }
    }

    /// Backoff hint for retryable errors, `None` otherwise.
    pub fn retry_at(&self) -> Option<DateTime<Utc>> {
        match self {
            EnforcementError::RateLimited { reset_at } => Some(*reset_at),
            _ => None,
        }
    }
}
