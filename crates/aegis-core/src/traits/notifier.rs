use chrono::{DateTime, Utc};

use crate::errors::AegisResult;
use crate::models::{DeliveryResult, OverrideRecord, SuspensionReason};

/// What the enforcement layer needs from the notification manager.
///
/// Kept as a seam so the suspension and override managers never depend on
/// the notify crate directly, and so tests can observe dispatches.
pub trait ISuspensionNotifier: Send + Sync {
    fn send_suspension_notice(
        &self,
        project_id: &str,
        reason: SuspensionReason,
        suspended_at: DateTime<Utc>,
    ) -> AegisResult<Vec<DeliveryResult>>;

    fn send_override_notice(
        &self,
        project_id: &str,
        record: &OverrideRecord,
    ) -> AegisResult<Vec<DeliveryResult>>;
}
