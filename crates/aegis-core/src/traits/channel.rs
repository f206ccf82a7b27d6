use crate::errors::NotifyError;
use crate::models::{Channel, Notification};

/// External delivery transport for one channel (email, in-app, ...).
/// Delivery mechanics are out of scope; this is the boundary.
pub trait IDeliveryChannel: Send + Sync {
    fn kind(&self) -> Channel;

    /// Attempt one delivery. A failure here is recorded on the
    /// notification and retried by the sweep, never propagated upward.
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}
