/// Notification-layer failures. Logged and retried by the sweep; never
/// block the enforcement action that triggered the notice.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("no recipients resolved for project {project_id}")]
    NoRecipients { project_id: String },

    #[error("delivery failed on {channel} to {recipient}: {reason}")]
    DeliveryFailed {
        channel: String,
        recipient: String,
        reason: String,
    },

    #[error("recipient directory unavailable: {reason}")]
    DirectoryUnavailable { reason: String },
}
