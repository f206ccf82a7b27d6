//! Per-project enforcement state: status, resource caps, live usage counters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::suspension::SuspensionReason;

/// Enforcement lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Suspended,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Suspended => "suspended",
            ProjectStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProjectStatus::Active),
            "suspended" => Some(ProjectStatus::Suspended),
            "archived" => Some(ProjectStatus::Archived),
            _ => None,
        }
    }
}

/// One row per project. Caps are mutated only by the quota and override
/// managers; detection logic never touches them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEnforcementState {
    pub project_id: String,
    pub status: ProjectStatus,
    /// Resource name → cap. A missing resource means uncapped.
    pub caps: HashMap<String, i64>,
    /// Resource name → consumed amount in the current accounting period.
    pub usage: HashMap<String, i64>,
    pub suspended_at: Option<DateTime<Utc>>,
    pub suspension_reason: Option<SuspensionReason>,
}

impl ProjectEnforcementState {
    /// A freshly provisioned project: active, given caps, zero usage.
    pub fn provisioned(project_id: &str, caps: HashMap<String, i64>) -> Self {
        Self {
            project_id: project_id.to_string(),
            status: ProjectStatus::Active,
            caps,
            usage: HashMap::new(),
            suspended_at: None,
            suspension_reason: None,
        }
    }

    /// Whether the project may receive new resource-consuming operations.
    pub fn accepts_work(&self) -> bool {
        self.status == ProjectStatus::Active
    }
}
