//! Domain models shared across the workspace.

pub mod actor;
pub mod audit;
pub mod detection;
pub mod metric_sample;
pub mod notification;
pub mod override_record;
pub mod project_state;
pub mod rate_limit;
pub mod suspension;

pub use actor::{Actor, ActorType, OperatorContext, OperatorRole};
pub use audit::AuditLogEntry;
pub use detection::{DetectionResult, DetectorKind, RecommendedAction, Severity};
pub use metric_sample::{MetricSample, MetricWindow};
pub use notification::{Channel, DeliveryResult, DeliveryStatus, Notification};
pub use override_record::{OverrideAction, OverrideOutcome, OverrideRecord, OverrideRequest};
pub use project_state::{ProjectEnforcementState, ProjectStatus};
pub use rate_limit::{IdentifierType, RateLimitDecision};
pub use suspension::{SuspensionReason, SuspensionRecord};
