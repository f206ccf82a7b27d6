//! Append-only audit log entries. Never mutated or deleted by application logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::actor::ActorType;

/// One audit row. `metadata` is free-form structured context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub actor_id: String,
    pub actor_type: ActorType,
    pub action: String,
    pub target_type: String,
    pub target_id: String,
    pub project_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
