//! # aegis-enforcement
//!
//! Enforcement over project state: the suspension state machine, quota
//! caps, the audited operator override path, and the sliding-window rate
//! limiter that gates it. The [`sweep::EnforcementSweep`] ties the
//! detection scan into suspensions.

pub mod override_mgr;
pub mod quota;
pub mod rate_limiter;
pub mod suspension;
pub mod sweep;

pub use override_mgr::OverrideManager;
pub use quota::{QuotaCheck, QuotaManager};
pub use rate_limiter::RateLimiter;
pub use suspension::{SuspensionManager, SuspensionOutcome};
pub use sweep::{EnforcementSweep, SweepReport};
