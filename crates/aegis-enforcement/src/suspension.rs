//! Suspension manager — owns the ACTIVE ⇄ SUSPENDED state machine.
//!
//! Transitions are idempotent: suspending an already-suspended project (or
//! unsuspending an active one) changes nothing and creates no duplicate
//! records.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use aegis_core::errors::{AegisError, AegisResult, EnforcementError, StorageError};
use aegis_core::models::{
    Actor, DetectionResult, DetectorKind, ProjectEnforcementState, ProjectStatus,
    RecommendedAction, SuspensionReason, SuspensionRecord,
};
use aegis_core::traits::ISuspensionNotifier;
use aegis_storage::queries::{project_ops, suspension_ops};
use aegis_storage::{AuditLogger, StorageEngine};

/// What a transition did.
#[derive(Debug, Clone)]
pub struct SuspensionOutcome {
    /// False when the project was already in the target state.
    pub changed: bool,
    pub state: ProjectEnforcementState,
    /// The record opened (on suspend) or closed (on unsuspend), when one
    /// was touched.
    pub record: Option<SuspensionRecord>,
}

pub struct SuspensionManager {
    engine: Arc<StorageEngine>,
    notifier: Option<Arc<dyn ISuspensionNotifier>>,
}

impl SuspensionManager {
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            engine,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ISuspensionNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// ACTIVE → SUSPENDED. One transaction: open record, update state,
    /// audit. The notice is dispatched after commit; a delivery failure
    /// never blocks the transition.
    pub fn suspend(
        &self,
        project_id: &str,
        reason: SuspensionReason,
        actor: Actor,
    ) -> AegisResult<SuspensionOutcome> {
        let outcome = self.engine.pool().writer.with_conn_sync(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| {
                    AegisError::Storage(StorageError::TransactionAborted {
                        reason: format!("suspend begin: {e}"),
                    })
                })?;

            let result = (|| {
                let mut state = project_ops::get_project(&tx, project_id)?.ok_or_else(|| {
                    AegisError::Enforcement(EnforcementError::NotFound {
                        project_id: project_id.to_string(),
                    })
                })?;

                if state.status == ProjectStatus::Suspended {
                    return Ok(SuspensionOutcome {
                        changed: false,
                        state,
                        record: None,
                    });
                }

                let now = Utc::now();
                state.status = ProjectStatus::Suspended;
                state.suspended_at = Some(now);
                state.suspension_reason = Some(reason);
                project_ops::update_project(&tx, &state)?;

                let record = SuspensionRecord::open(project_id, reason, actor.clone());
                suspension_ops::insert_record(&tx, &record)?;

                AuditLogger::log_enforcement(
                    &tx,
                    &actor,
                    "project_suspended",
                    "suspension",
                    &record.id.to_string(),
                    project_id,
                    serde_json::json!({ "reason": reason.as_str() }),
                )?;

                Ok(SuspensionOutcome {
                    changed: true,
                    state,
                    record: Some(record),
                })
            })();

            match result {
                Ok(outcome) => {
                    tx.commit()
                        .map_err(|e| {
                            AegisError::Storage(StorageError::TransactionAborted {
                                reason: format!("suspend commit: {e}"),
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

        if outcome.changed {
            tracing::info!(project_id, reason = reason.as_str(), "project suspended");
            let suspended_at = outcome.state.suspended_at.unwrap_or_else(Utc::now);
            self.dispatch_notice(project_id, reason, suspended_at);
        }
        Ok(outcome)
    }

    /// SUSPENDED → ACTIVE. Closes the open record, updates state, audits.
    pub fn unsuspend(&self, project_id: &str, actor: Actor) -> AegisResult<SuspensionOutcome> {
        self.engine.pool().writer.with_conn_sync(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| {
                    AegisError::Storage(StorageError::TransactionAborted {
                        reason: format!("unsuspend begin: {e}"),
                    })
                })?;

            let result = (|| {
                let mut state = project_ops::get_project(&tx, project_id)?.ok_or_else(|| {
                    AegisError::Enforcement(EnforcementError::NotFound {
                        project_id: project_id.to_string(),
                    })
                })?;

                if state.status == ProjectStatus::Active {
                    return Ok(SuspensionOutcome {
                        changed: false,
                        state,
                        record: None,
                    });
                }

                let now = Utc::now();
                let record = suspension_ops::open_record(&tx, project_id)?;
                suspension_ops::resolve_open(&tx, project_id, now)?;

                state.status = ProjectStatus::Active;
                state.suspended_at = None;
                state.suspension_reason = None;
                project_ops::update_project(&tx, &state)?;

                AuditLogger::log_enforcement(
                    &tx,
                    &actor,
                    "project_unsuspended",
                    "suspension",
                    record
                        .as_ref()
                        .map(|r| r.id.to_string())
                        .unwrap_or_default()
                        .as_str(),
                    project_id,
                    serde_json::json!({}),
                )?;

                Ok(SuspensionOutcome {
                    changed: true,
                    state,
                    record,
                })
            })();

            match result {
                Ok(outcome) => {
                    tx.commit()
                        .map_err(|e| {
                            AegisError::Storage(StorageError::TransactionAborted {
                                reason: format!("unsuspend commit: {e}"),
                            })
                        })?;
                    Ok(outcome)
                }
                Err(e) => {
                    let _ = tx.rollback();
                    Err(e)
                }
            }
        })
    }

    /// Bridge an actionable detection into the state machine. Only
    /// `Suspend` recommendations transition state; everything else is the
    /// notification layer's concern.
    pub fn apply_detection(&self, result: &DetectionResult) -> AegisResult<Option<SuspensionOutcome>> {
        if result.recommended_action != RecommendedAction::Suspend {
            return Ok(None);
        }
        let reason = match result.detector {
            DetectorKind::ErrorRate => SuspensionReason::ErrorRate,
            DetectorKind::Spike => SuspensionReason::Spike,
            DetectorKind::Pattern => SuspensionReason::Pattern,
        };
        self.suspend(&result.project_id, reason, Actor::System)
            .map(Some)
    }

    fn dispatch_notice(
        &self,
        project_id: &str,
        reason: SuspensionReason,
        suspended_at: DateTime<Utc>,
    ) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.send_suspension_notice(project_id, reason, suspended_at) {
                tracing::warn!(project_id, error = %e, "suspension notice dispatch failed");
            }
        }
    }
}
