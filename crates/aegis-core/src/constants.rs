/// Aegis system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of override records returned by a history query.
pub const MAX_OVERRIDE_HISTORY_LIMIT: usize = 100;

/// Default number of override records returned by a history query.
pub const DEFAULT_OVERRIDE_HISTORY_LIMIT: usize = 50;

/// Metric samples older than this many days are eligible for pruning.
pub const METRIC_RETENTION_DAYS: u64 = 90;
