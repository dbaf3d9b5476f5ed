//! Wall-clock scheduling for report cycles.
//!
//! A background task wakes once a minute and fires a report cycle whenever
//! the UTC clock sits on a 3-hour boundary (00:00, 03:00, ... 21:00). The
//! boundary test is a pure predicate so the alignment rules are testable
//! without a runtime, and each boundary is served at most once even if
//! several ticks land inside the same minute.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::aggregator::ReportAggregator;

/// How often the scheduler checks the clock.
const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Whether `now` sits on a report boundary: a whole hour divisible by three.
#[must_use]
pub fn should_emit(now: DateTime<Utc>) -> bool {
    now.hour() % 3 == 0 && now.minute() == 0
}

/// Identifies the minute `now` falls in, for serve-once bookkeeping.
fn boundary_id(now: DateTime<Utc>) -> i64 {
    now.timestamp() / 60
}

/// Spawns the scheduler loop. Aborting the handle stops it.
///
/// Missed ticks are skipped rather than burst, so a stalled host resumes on
/// the next real minute instead of replaying boundaries that already passed.
#[must_use]
pub fn start(aggregator: Arc<ReportAggregator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("report scheduler started");
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_served: Option<i64> = None;

        loop {
            interval.tick().await;
            let now = Utc::now();
            if !should_emit(now) {
                continue;
            }
            let boundary = boundary_id(now);
            if last_served == Some(boundary) {
                continue;
            }
            last_served = Some(boundary);
            aggregator.run_cycle(now).await;
        }
    })
}
