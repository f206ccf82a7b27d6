use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::Channel;

/// Notification subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Delivery attempts before a notification is marked dead.
    pub max_attempts: u32,
    /// Channels fanned out to per recipient.
    pub channels: Vec<Channel>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_NOTIFY_MAX_ATTEMPTS,
            channels: vec![Channel::Email, Channel::InApp],
        }
    }
}
