//! # aegis-core
//!
//! Foundation crate for the Aegis abuse control plane.
//! Defines all models, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::AegisConfig;
pub use errors::{AegisError, AegisResult};
pub use models::{
    Actor, ActorType, DetectionResult, OverrideAction, ProjectEnforcementState, ProjectStatus,
    RecommendedAction, Severity, SuspensionReason,
};
