//! Sliding-window rate limiter over the persisted `rate_limits` counters.

use std::sync::Arc;

use chrono::Utc;

use aegis_core::config::RateLimitConfig;
use aegis_core::errors::{AegisError, AegisResult, EnforcementError};
use aegis_core::models::{IdentifierType, RateLimitDecision};
use aegis_storage::queries::rate_limit_ops;
use aegis_storage::StorageEngine;

pub struct RateLimiter {
    engine: Arc<StorageEngine>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(engine: Arc<StorageEngine>, config: RateLimitConfig) -> Self {
        Self { engine, config }
    }

    /// Count an attempt and decide. The underlying increment is one atomic
    /// upsert; the configured quota is never exceeded within a window, even
    /// under concurrent callers.
    pub fn check(
        &self,
        identifier_type: IdentifierType,
        identifier_value: &str,
    ) -> AegisResult<RateLimitDecision> {
        self.engine.pool().writer.with_conn_sync(|conn| {
            rate_limit_ops::check_and_increment(
                conn,
                identifier_type,
                identifier_value,
                self.config.max_attempts,
                self.config.window_secs,
                Utc::now(),
            )
        })
    }

    /// Like [`check`](Self::check), but maps a denial to
    /// [`EnforcementError::RateLimited`] carrying the reset timestamp.
    pub fn enforce(
        &self,
        identifier_type: IdentifierType,
        identifier_value: &str,
    ) -> AegisResult<RateLimitDecision> {
        let decision = self.check(identifier_type, identifier_value)?;
        if !decision.allowed {
            return Err(AegisError::Enforcement(EnforcementError::RateLimited {
                reset_at: decision.reset_at,
            }));
        }
        Ok(decision)
    }

    /// Drop expired windows. Opportunistic housekeeping, safe to skip.
    pub fn prune_expired(&self) -> AegisResult<usize> {
        self.engine.pool().writer.with_conn_sync(|conn| {
            rate_limit_ops::prune_expired(conn, self.config.window_secs, Utc::now())
        })
    }
}
