//! Shared handle over the counter state machine.
//!
//! [`JokeCounter`] wraps [`CounterState`] in a mutex so HTTP handlers and the
//! report scheduler can share one counter. Every transition happens under the
//! lock, so each vote observes the table exactly as the previous one left it.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::errors::CounterError;
use super::state::{CounterState, EpochSnapshot, ResetOutcome, VoteOutcome};
use crate::metrics;
use crate::rates::JokeRate;

/// Point-in-time view of the counter for health reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterStatus {
    pub agreed_count: u64,
    pub witnesses: usize,
    pub epoch_start: DateTime<Utc>,
    pub rate: JokeRate,
}

/// Thread-safe joke counter shared across the process.
#[derive(Debug)]
pub struct JokeCounter {
    state: Mutex<CounterState>,
}

impl JokeCounter {
    #[must_use]
    pub fn new(max_witnesses: usize) -> Self {
        Self {
            state: Mutex::new(CounterState::new(max_witnesses, Utc::now())),
        }
    }

    /// Records a vote from `witness_id` at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::WitnessLimitExceeded`] when the witness is
    /// unknown and the table is full.
    pub async fn vote(&self, witness_id: &str) -> Result<VoteOutcome, CounterError> {
        let mut state = self.state.lock().await;
        match state.vote(witness_id, Utc::now()) {
            Ok(outcome) => {
                metrics::record_vote(outcome.advanced);
                metrics::set_counter_gauges(state.agreed_count(), state.witness_len());
                if outcome.advanced {
                    info!(
                        witness = %witness_id,
                        agreed_count = outcome.agreed_count,
                        "count advanced by agreement"
                    );
                } else {
                    debug!(
                        witness = %witness_id,
                        witness_count = outcome.witness_count,
                        agreed_count = outcome.agreed_count,
                        "vote recorded, waiting for agreement"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                metrics::record_vote_rejected();
                warn!(
                    witness = %witness_id,
                    witnesses = state.witness_len(),
                    "vote rejected, witness table full"
                );
                Err(e)
            }
        }
    }

    /// Zeroes `witness_id`'s tally and applies a full reset if a quorum of
    /// zeroed tallies has formed. Always succeeds.
    pub async fn reset(&self, witness_id: &str) -> ResetOutcome {
        let mut state = self.state.lock().await;
        let outcome = state.reset(witness_id, Utc::now());
        metrics::record_reset(outcome.reset_all);
        metrics::set_counter_gauges(state.agreed_count(), state.witness_len());
        if outcome.reset_all {
            info!(witness = %witness_id, "reset quorum reached, counter zeroed");
        } else {
            debug!(witness = %witness_id, "witness tally zeroed");
        }
        outcome
    }

    /// Captures the closing epoch for reporting and starts a fresh one.
    ///
    /// `now` comes from the caller so the scheduler stamps the snapshot with
    /// the tick time it acted on.
    pub async fn snapshot_and_roll_epoch(&self, now: DateTime<Utc>) -> EpochSnapshot {
        let mut state = self.state.lock().await;
        let snapshot = state.snapshot_and_roll_epoch(now);
        metrics::set_counter_gauges(0, state.witness_len());
        info!(
            agreed_count = snapshot.agreed_count,
            witnesses = snapshot.witnesses.len(),
            "epoch closed for reporting"
        );
        snapshot
    }

    pub async fn status(&self) -> CounterStatus {
        let state = self.state.lock().await;
        CounterStatus {
            agreed_count: state.agreed_count(),
            witnesses: state.witness_len(),
            epoch_start: state.epoch_start(),
            rate: state.rate(Utc::now()),
        }
    }
}
