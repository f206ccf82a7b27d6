//! Who performed an enforcement-relevant action: the system itself or a human operator.

use serde::{Deserialize, Serialize};

/// The acting party behind a state transition or audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Actor {
    /// Automated enforcement (detection scan, quota policy).
    System,
    /// A human operator identified by their user id.
    User(String),
}

impl Actor {
    /// Coarse classification persisted in the audit log.
    pub fn actor_type(&self) -> ActorType {
        match self {
            Actor::System => ActorType::System,
            Actor::User(_) => ActorType::User,
        }
    }

    /// Stable identifier string for persistence. System actions use `"system"`.
    pub fn actor_id(&self) -> &str {
        match self {
            Actor::System => "system",
            Actor::User(id) => id,
        }
    }
}

/// Actor classification stored in `audit_logs.actor_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    System,
    User,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::System => "system",
            ActorType::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(ActorType::System),
            "user" => Some(ActorType::User),
            _ => None,
        }
    }
}

/// Role held by an operator, as reported by the external authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorRole {
    Viewer,
    Operator,
    Admin,
}

impl OperatorRole {
    /// Whether this role may perform manual overrides.
    pub fn can_override(&self) -> bool {
        matches!(self, OperatorRole::Operator | OperatorRole::Admin)
    }
}

/// Identity and provenance of an operator-facing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorContext {
    pub operator_id: String,
    pub role: OperatorRole,
    /// Client IP, kept for rate-limit keying and forensics.
    pub client_ip: String,
}
