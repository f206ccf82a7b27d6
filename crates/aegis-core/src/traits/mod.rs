//! Trait seams between subsystems and toward external collaborators.

pub mod channel;
pub mod directory;
pub mod metrics_source;
pub mod notifier;

pub use channel::IDeliveryChannel;
pub use directory::{IRecipientDirectory, Recipient};
pub use metrics_source::IMetricsSource;
pub use notifier::ISuspensionNotifier;
