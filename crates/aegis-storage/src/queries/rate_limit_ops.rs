//! Rate-limit window counters. The increment is a single atomic upsert;
//! concurrent callers racing on the same window always see a strictly
//! correct count.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

use aegis_core::errors::AegisResult;
use aegis_core::models::{IdentifierType, RateLimitDecision};

use crate::to_storage_err;

/// Floor `now` to the start of the fixed window containing it.
pub fn window_start(now: DateTime<Utc>, window_secs: u64) -> DateTime<Utc> {
    let secs = window_secs as i64;
    let ts = now.timestamp() - now.timestamp().rem_euclid(secs);
    DateTime::from_timestamp(ts, 0).unwrap_or(now)
}

/// Count an attempt against `(identifier_type, identifier_value)` in the
/// window containing `now`, and decide whether it is within `max_attempts`.
///
/// `INSERT .. ON CONFLICT .. DO UPDATE .. RETURNING` makes the
/// increment-and-read one statement, never read-then-write.
pub fn check_and_increment(
    conn: &Connection,
    identifier_type: IdentifierType,
    identifier_value: &str,
    max_attempts: i64,
    window_secs: u64,
    now: DateTime<Utc>,
) -> AegisResult<RateLimitDecision> {
    let start = window_start(now, window_secs);
    let attempt_count: i64 = conn
        .query_row(
            "INSERT INTO rate_limits (identifier_type, identifier_value, attempt_count, window_start)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(identifier_type, identifier_value, window_start)
             DO UPDATE SET attempt_count = attempt_count + 1
             RETURNING attempt_count",
            params![identifier_type.as_str(), identifier_value, start.to_rfc3339()],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(RateLimitDecision {
        allowed: attempt_count <= max_attempts,
        attempt_count,
        reset_at: start + Duration::seconds(window_secs as i64),
    })
}

/// Drop windows that ended before `now`. Returns the number removed.
pub fn prune_expired(conn: &Connection, window_secs: u64, now: DateTime<Utc>) -> AegisResult<usize> {
    let cutoff = now - Duration::seconds(window_secs as i64);
    conn.execute(
        "DELETE FROM rate_limits WHERE window_start < ?1",
        params![cutoff.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
