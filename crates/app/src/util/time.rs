use chrono::{DateTime, Duration, Utc};

use pruner_core::{LOOKBACK_DAYS, format_ts};

/// Events stamped strictly before this instant are past retention.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: i64) -> String {
    format_ts(now - Duration::days(retention_days))
}

/// Start of the aggregation window. Independent of the plan's retention.
pub fn lookback_start(now: DateTime<Utc>) -> String {
    format_ts(now - Duration::days(LOOKBACK_DAYS))
}
