//! Suspension records: one row per suspension event, at most one open per project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::Actor;

/// Why a project was suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionReason {
    QuotaExceeded,
    ErrorRate,
    Spike,
    Pattern,
    Manual,
}

impl SuspensionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuspensionReason::QuotaExceeded => "quota_exceeded",
            SuspensionReason::ErrorRate => "error_rate",
            SuspensionReason::Spike => "spike",
            SuspensionReason::Pattern => "pattern",
            SuspensionReason::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quota_exceeded" => Some(SuspensionReason::QuotaExceeded),
            "error_rate" => Some(SuspensionReason::ErrorRate),
            "spike" => Some(SuspensionReason::Spike),
            "pattern" => Some(SuspensionReason::Pattern),
            "manual" => Some(SuspensionReason::Manual),
            _ => None,
        }
    }
}

/// One suspension event. `resolved_at` is set when the project is
/// reactivated; an open record is the one with `resolved_at = None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspensionRecord {
    pub id: Uuid,
    pub project_id: String,
    pub reason: SuspensionReason,
    pub triggered_by: Actor,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl SuspensionRecord {
    pub fn open(project_id: &str, reason: SuspensionReason, triggered_by: Actor) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id: project_id.to_string(),
            reason,
            triggered_by,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }
}
