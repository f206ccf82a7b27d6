//! Quota manager: per-project resource caps checked and enforced against
//! the live usage counters.

use std::sync::Arc;

use aegis_core::errors::{AegisError, AegisResult, EnforcementError};
use aegis_core::models::ProjectStatus;
use aegis_storage::queries::project_ops;
use aegis_storage::StorageEngine;

/// Read-side quota answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    pub allowed: bool,
    pub remaining: i64,
}

pub struct QuotaManager {
    engine: Arc<StorageEngine>,
}

impl QuotaManager {
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Whether the project currently has headroom for `resource`.
    /// No side effects.
    pub fn check_quota(&self, project_id: &str, resource: &str) -> AegisResult<QuotaCheck> {
        let remaining = self
            .engine
            .with_reader(|conn| project_ops::remaining_quota(conn, project_id, resource))?;
        Ok(QuotaCheck {
            allowed: remaining > 0,
            remaining,
        })
    }

    /// Consume `requested` units of `resource`, failing with
    /// [`EnforcementError::QuotaExceeded`] when the cap would be breached.
    ///
    /// The increment is a single conditional UPDATE on the write
    /// connection; concurrent callers for the same project cannot
    /// over-consume through a read-then-write race. When the update does
    /// not apply, the project state is read back to classify the refusal.
    pub fn enforce_cap(&self, project_id: &str, resource: &str, requested: i64) -> AegisResult<()> {
        if requested <= 0 {
            return Err(AegisError::Enforcement(EnforcementError::Validation {
                message: format!("requested amount must be positive, got {requested}"),
            }));
        }

        self.engine.pool().writer.with_conn_sync(|conn| {
            let outcome = project_ops::try_consume(conn, project_id, resource, requested)?;
            if outcome.applied {
                return Ok(());
            }

            match project_ops::get_project(conn, project_id)? {
                None => Err(AegisError::Enforcement(EnforcementError::NotFound {
                    project_id: project_id.to_string(),
                })),
                Some(state) if state.status != ProjectStatus::Active => {
                    Err(AegisError::Enforcement(EnforcementError::ProjectSuspended {
                        project_id: project_id.to_string(),
                    }))
                }
                Some(_) => Err(AegisError::Enforcement(EnforcementError::QuotaExceeded {
                    resource: resource.to_string(),
                    requested,
                    remaining: outcome.remaining,
                })),
            }
        })
    }
}
