//! Rollup generation over closed counter epochs.
//!
//! Every cycle closes the current epoch, records a 3-hour report, and folds
//! the result into longer windows. Cycles are numbered from process start, so
//! the wider rollups cover process-relative windows rather than calendar
//! ones: the second cycle emits a 6-hour report, the fourth a 12-hour report,
//! the eighth a daily report. Daily totals accumulate across cycles and reset
//! once the daily report is out.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{error, info};

use super::record::{ReportKind, ReportRecord};
use super::sink::ReportSink;
use crate::counter::JokeCounter;
use crate::metrics;
use crate::rates::JokeRate;

/// 3-hour cycles per daily report.
const TICKS_PER_DAY: u64 = 8;
/// Epoch counts retained for windowed sums. One day's worth.
const HISTORY_DEPTH: usize = 8;

#[derive(Debug, Clone, Default)]
struct CumulativeTotals {
    joke_count: u64,
    rate: JokeRate,
}

#[derive(Debug, Default)]
struct AggregatorState {
    /// Completed cycles since process start.
    ticks: u64,
    /// Agreed counts of recent epochs, oldest first.
    history: VecDeque<u64>,
    /// Running totals since the last daily report.
    cumulative: CumulativeTotals,
}

/// Turns epoch snapshots into persisted report records.
pub struct ReportAggregator {
    counter: Arc<JokeCounter>,
    sink: Arc<dyn ReportSink>,
    state: Mutex<AggregatorState>,
}

impl ReportAggregator {
    #[must_use]
    pub fn new(counter: Arc<JokeCounter>, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            counter,
            sink,
            state: Mutex::new(AggregatorState::default()),
        }
    }

    /// Runs one report cycle at `now`: close the epoch, emit the 3-hour
    /// record, and emit whichever wider rollups this tick completes. The
    /// aggregator lock is held until every record reached the sink, so
    /// cycles never interleave.
    ///
    /// Persistence failures are logged and counted but never undo the epoch
    /// roll; the counter has already moved on.
    pub async fn run_cycle(&self, now: DateTime<Utc>) {
        let snapshot = self.counter.snapshot_and_roll_epoch(now).await;

        let mut state = self.state.lock().await;
        state.ticks += 1;

        state.history.push_back(snapshot.agreed_count);
        while state.history.len() > HISTORY_DEPTH {
            state.history.pop_front();
        }
        state.cumulative.joke_count += snapshot.agreed_count;
        state.cumulative.rate = snapshot.rate;

        let mut records = vec![ReportRecord::new(
            ReportKind::ThreeHour,
            now,
            snapshot.agreed_count,
            snapshot.rate,
        )
        .with_ip_counts(snapshot.witnesses)];

        if state.ticks % 2 == 0 {
            records.push(ReportRecord::new(
                ReportKind::SixHour,
                now,
                Self::window_sum(&state.history, 2),
                state.cumulative.rate,
            ));
        }
        if state.ticks % 4 == 0 {
            records.push(ReportRecord::new(
                ReportKind::TwelveHour,
                now,
                Self::window_sum(&state.history, 4),
                state.cumulative.rate,
            ));
        }
        if state.ticks % TICKS_PER_DAY == 0 {
            records.push(ReportRecord::new(
                ReportKind::Daily,
                now,
                state.cumulative.joke_count,
                state.cumulative.rate,
            ));
            state.cumulative = CumulativeTotals::default();
        }

        info!(
            tick = state.ticks,
            joke_count = snapshot.agreed_count,
            reports = records.len(),
            "report cycle complete"
        );

        for record in records {
            self.emit(record).await;
        }
    }

    /// Sum of the most recent `n` epoch counts, current epoch included.
    fn window_sum(history: &VecDeque<u64>, n: usize) -> u64 {
        history.iter().rev().take(n).sum()
    }

    async fn emit(&self, record: ReportRecord) {
        match self.sink.append(&record).await {
            Ok(()) => metrics::record_report(record.kind.as_str()),
            Err(e) => {
                metrics::record_report_persist_failure();
                error!(
                    kind = record.kind.as_str(),
                    error = %e,
                    "failed to persist report, dropping record"
                );
            }
        }
    }
}
