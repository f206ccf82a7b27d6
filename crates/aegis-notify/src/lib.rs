//! # aegis-notify
//!
//! Builds and dispatches enforcement notices. Recipients come from the
//! [`IRecipientDirectory`] seam, delivery goes through [`IDeliveryChannel`]
//! implementations; both are external collaborators. Failed deliveries are
//! persisted and retried by [`NotificationManager::retry_failed`] until the
//! attempt ceiling, then marked dead.
//!
//! [`IRecipientDirectory`]: aegis_core::traits::IRecipientDirectory
//! [`IDeliveryChannel`]: aegis_core::traits::IDeliveryChannel

pub mod engine;
pub mod template;

pub use engine::{NotificationManager, RetrySummary};
