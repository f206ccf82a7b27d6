//! Operator override types: request, immutable audit-grade record, outcome.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project_state::ProjectEnforcementState;

/// What a manual override does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAction {
    Unsuspend,
    IncreaseCaps,
    Both,
}

impl OverrideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideAction::Unsuspend => "unsuspend",
            OverrideAction::IncreaseCaps => "increase_caps",
            OverrideAction::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unsuspend" => Some(OverrideAction::Unsuspend),
            "increase_caps" => Some(OverrideAction::IncreaseCaps),
            "both" => Some(OverrideAction::Both),
            _ => None,
        }
    }

    /// Whether this action lifts a suspension.
    pub fn unsuspends(&self) -> bool {
        matches!(self, OverrideAction::Unsuspend | OverrideAction::Both)
    }

    /// Whether this action raises caps and therefore requires `new_caps`.
    pub fn raises_caps(&self) -> bool {
        matches!(self, OverrideAction::IncreaseCaps | OverrideAction::Both)
    }
}

/// Incoming override request body, pre-validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub project_id: String,
    pub action: OverrideAction,
    pub reason: String,
    /// Resource name → new cap. Required for `IncreaseCaps`/`Both`; caps may
    /// only increase through this path.
    #[serde(default)]
    pub new_caps: Option<HashMap<String, i64>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Immutable record of a performed override, with full before/after
/// snapshots of the project's enforcement state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub id: Uuid,
    pub project_id: String,
    pub action: OverrideAction,
    pub reason: String,
    pub notes: Option<String>,
    pub performed_by: String,
    pub performed_at: DateTime<Utc>,
    pub previous_state: ProjectEnforcementState,
    pub new_state: ProjectEnforcementState,
}

/// Returned to the caller for display: the record plus both snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideOutcome {
    pub record: OverrideRecord,
    pub previous_state: ProjectEnforcementState,
    pub new_state: ProjectEnforcementState,
}
