//! Operator override manager: validated, rate-limited, atomically applied
//! reversals and cap adjustments with an audit-grade record.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use aegis_core::errors::{AegisError, AegisResult, EnforcementError, StorageError};
use aegis_core::models::{
    Actor, IdentifierType, OperatorContext, OverrideOutcome, OverrideRecord, OverrideRequest,
    ProjectStatus,
};
use aegis_core::traits::ISuspensionNotifier;
use aegis_storage::queries::{override_ops, project_ops, suspension_ops};
use aegis_storage::{AuditLogger, StorageEngine};

use crate::rate_limiter::RateLimiter;

pub struct OverrideManager {
    engine: Arc<StorageEngine>,
    rate_limiter: RateLimiter,
    notifier: Option<Arc<dyn ISuspensionNotifier>>,
}

impl OverrideManager {
    pub fn new(engine: Arc<StorageEngine>, rate_limiter: RateLimiter) -> Self {
        Self {
            engine,
            rate_limiter,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ISuspensionNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Apply a manual override. Preconditions in order: role, rate limit,
    /// request validation. The mutation itself is one transaction; any
    /// failure rolls the whole thing back, so a partially applied override
    /// (caps raised but suspension kept, or state changed without its
    /// record) is never observable.
    pub fn perform_override(
        &self,
        request: &OverrideRequest,
        operator: &OperatorContext,
    ) -> AegisResult<OverrideOutcome> {
        // Denied attempts are audited before the error is returned.
        if !operator.role.can_override() {
            let op = operator.operator_id.clone();
            self.engine.pool().writer.with_conn_sync(|conn| {
                AuditLogger::log_denied(conn, &op, "perform_override", Some(&request.project_id))
            })?;
            return Err(AegisError::Enforcement(EnforcementError::Authorization {
                actor_id: operator.operator_id.clone(),
                attempted: "perform_override".to_string(),
            }));
        }

        self.rate_limiter
            .enforce(IdentifierType::Org, &operator.operator_id)?;

        validate_request(request)?;

        let outcome = self.apply(request, operator)?;

        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.send_override_notice(&request.project_id, &outcome.record) {
                tracing::warn!(
                    project_id = %request.project_id,
                    error = %e,
                    "override notice dispatch failed"
                );
            }
        }
        Ok(outcome)
    }

    /// Override history for a project, newest first. `limit` clamped to
    /// [1, 100], default 50.
    pub fn list_overrides(
        &self,
        project_id: &str,
        limit: Option<usize>,
    ) -> AegisResult<Vec<OverrideRecord>> {
        self.engine
            .with_reader(|conn| override_ops::list_by_project(conn, project_id, limit))
    }

    /// The transactional core: snapshot, apply, persist record, audit.
    fn apply(
        &self,
        request: &OverrideRequest,
        operator: &OperatorContext,
    ) -> AegisResult<OverrideOutcome> {
        let outcome = self.engine.pool().writer.with_conn_sync(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| {
                    AegisError::Storage(StorageError::TransactionAborted {
                        reason: format!("override begin: {e}"),
                    })
                })?;

            let result = (|| {
                let previous =
                    project_ops::get_project(&tx, &request.project_id)?.ok_or_else(|| {
                        AegisError::Enforcement(EnforcementError::NotFound {
                            project_id: request.project_id.clone(),
                        })
                    })?;

                let mut state = previous.clone();

                if request.action.unsuspends() && state.status == ProjectStatus::Suspended {
                    state.status = ProjectStatus::Active;
                    state.suspended_at = None;
                    state.suspension_reason = None;
                    suspension_ops::resolve_open(&tx, &request.project_id, Utc::now())?;
                }

                if let Some(new_caps) = &request.new_caps {
                    for (resource, &new_cap) in new_caps {
                        let current = state.caps.get(resource).copied().ok_or_else(|| {
                            AegisError::Enforcement(EnforcementError::Validation {
                                message: format!(
                                    "resource {resource:?} has no existing cap; \
                                     introducing one is not an override"
                                ),
                            })
                        })?;
                        if new_cap < current {
                            return Err(AegisError::Enforcement(EnforcementError::Validation {
                                message: format!(
                                    "cap for {resource:?} may only increase \
                                     ({current} -> {new_cap} rejected)"
                                ),
                            }));
                        }
                        state.caps.insert(resource.clone(), new_cap);
                    }
                }

                project_ops::update_project(&tx, &state)?;

                let record = OverrideRecord {
                    id: Uuid::new_v4(),
                    project_id: request.project_id.clone(),
                    action: request.action,
                    reason: request.reason.clone(),
                    notes: request.notes.clone(),
                    performed_by: operator.operator_id.clone(),
                    performed_at: Utc::now(),
                    previous_state: previous.clone(),
                    new_state: state.clone(),
                };
                override_ops::insert_record(&tx, &record)?;

                AuditLogger::log_enforcement(
                    &tx,
                    &Actor::User(operator.operator_id.clone()),
                    "override_performed",
                    "override",
                    &record.id.to_string(),
                    &request.project_id,
                    serde_json::json!({
                        "action": request.action.as_str(),
                        "reason": request.reason,
                        "client_ip": operator.client_ip,
                    }),
                )?;

                Ok(OverrideOutcome {
                    previous_state: previous,
                    new_state: state,
                    record,
                })
            })();

            match result {
                Ok(outcome) => {
                    tx.commit()
                        .map_err(|e| {
                            AegisError::Storage(StorageError::TransactionAborted {
                                reason: format!("override commit: {e}"),
                            })
                        })?;
                    Ok(outcome)
                }
                Err(e) => {
                    let _ = tx.rollback();
                    Err(e)
                }
            }
        })?;

        tracing::info!(
            project_id = %request.project_id,
            action = request.action.as_str(),
            operator = %operator.operator_id,
            "override applied"
        );
        Ok(outcome)
    }
}

/// Request body validation. Everything here is client-fixable.
fn validate_request(request: &OverrideRequest) -> AegisResult<()> {
    let fail = |message: String| {
        Err(AegisError::Enforcement(EnforcementError::Validation {
            message,
        }))
    };

    if request.reason.trim().is_empty() {
        return fail("reason must not be empty".to_string());
    }
    if request.action.raises_caps() {
        match &request.new_caps {
            None => return fail(format!("action {:?} requires new_caps", request.action.as_str())),
            Some(caps) if caps.is_empty() => {
                return fail("new_caps must not be empty".to_string());
            }
            Some(caps) => {
                for (resource, &cap) in caps {
                    if cap <= 0 {
                        return fail(format!("cap for {resource:?} must be positive, got {cap}"));
                    }
                }
            }
        }
    } else if request.new_caps.is_some() {
        return fail("new_caps is only valid with increase_caps or both".to_string());
    }
    Ok(())
}
