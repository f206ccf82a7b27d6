//! Fixed-shape notice templates. Wording is part of the operator-facing
//! contract; structure, not prose, is what tests assert on.

use chrono::{DateTime, Utc};

use aegis_core::models::{OverrideRecord, SuspensionReason};

/// Subject and body for one notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

/// Notice sent to project stakeholders when a project is suspended.
pub fn suspension_notice(
    project_id: &str,
    reason: SuspensionReason,
    suspended_at: DateTime<Utc>,
) -> Rendered {
    Rendered {
        subject: format!("Project {project_id} has been suspended"),
        body: format!(
            "Your project {project_id} was suspended at {} (reason: {}).\n\
             New resource-consuming operations are blocked until the \
             suspension is lifted. Contact support to request a review.",
            suspended_at.to_rfc3339(),
            reason.as_str(),
        ),
    }
}

/// Notice sent after an operator override changed a project's enforcement
/// state.
pub fn override_notice(project_id: &str, record: &OverrideRecord) -> Rendered {
    Rendered {
        subject: format!("Enforcement override applied to project {project_id}"),
        body: format!(
            "An operator applied a {} override to project {project_id} at {}.\n\
             Status: {} -> {}.\nReason: {}",
            record.action.as_str(),
            record.performed_at.to_rfc3339(),
            record.previous_state.status.as_str(),
            record.new_state.status.as_str(),
            record.reason,
        ),
    }
}
