//! Sliding-window rate-limit counters keyed by (identifier type, value, window).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of identifier a window counts attempts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    Org,
    Ip,
}

impl IdentifierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::Org => "org",
            IdentifierType::Ip => "ip",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "org" => Some(IdentifierType::Org),
            "ip" => Some(IdentifierType::Ip),
            _ => None,
        }
    }
}

/// Outcome of one check-and-increment call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Attempts counted in the current window, including this one.
    pub attempt_count: i64,
    /// When the current window expires and the counter resets.
    pub reset_at: DateTime<Utc>,
}
