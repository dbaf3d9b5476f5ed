//! Joke rate estimation over the current epoch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estimated joke throughput, derived from the agreed count and epoch age.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JokeRate {
    pub per_hour: f64,
    pub per_day: f64,
}

/// Estimates the hourly and daily rates for an epoch.
///
/// Elapsed time is floored to one hour, so a count observed seconds into a
/// fresh epoch reports itself as the hourly rate rather than extrapolating
/// toward infinity. The daily rate is the hourly rate times 24.
#[must_use]
pub fn joke_rate(agreed_count: u64, epoch_start: DateTime<Utc>, now: DateTime<Utc>) -> JokeRate {
    let elapsed_ms = now.signed_duration_since(epoch_start).num_milliseconds().max(0);

    #[allow(clippy::cast_precision_loss)]
    let elapsed_hours = (elapsed_ms as f64 / 3_600_000.0).max(1.0);

    #[allow(clippy::cast_precision_loss)]
    let per_hour = agreed_count as f64 / elapsed_hours;

    JokeRate { per_hour, per_day: per_hour * 24.0 }
}
