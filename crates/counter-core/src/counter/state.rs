//! Quorum-gated counter state machine.
//!
//! The shared count lives here together with one tentative tally per
//! witness. All transitions are synchronous and take the current time as an
//! argument, which keeps the protocol fully deterministic under test; the
//! async wrapper in [`super::service`] owns locking and wall clocks.
//!
//! # Protocol
//!
//! - A vote bumps the voter's tentative tally. The agreed count only moves
//!   when at least [`AGREEMENT_QUORUM`] witnesses (the voter included) sit at
//!   or above the voter's new tally.
//! - When the agreed count advances, witnesses that fell behind are pulled up
//!   to it. Witnesses running ahead keep their lead.
//! - A reset zeroes one tally; once [`AGREEMENT_QUORUM`] tallies sit at zero,
//!   everything resets and a new epoch begins.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::errors::CounterError;
use crate::rates::{joke_rate, JokeRate};

/// Number of witnesses that must corroborate a value before the shared count
/// moves to it. Also the number of zeroed tallies that triggers a full reset.
pub const AGREEMENT_QUORUM: usize = 2;

/// Outcome of an accepted vote.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteOutcome {
    /// Agreed count after the vote. Unchanged unless `advanced` is set.
    pub agreed_count: u64,
    /// The voter's own tentative tally after the vote.
    pub witness_count: u64,
    /// Whether this vote carried the agreed count forward.
    pub advanced: bool,
    /// Rates for the epoch as of this vote.
    pub rate: JokeRate,
}

/// Outcome of a reset request. Resets always succeed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetOutcome {
    /// Whether a reset quorum formed and the whole counter was zeroed.
    pub reset_all: bool,
    /// Rates after the reset, so a full reset reports zero.
    pub rate: JokeRate,
}

/// Counter state captured by an epoch roll, taken before zeroing.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSnapshot {
    /// Agreed count at the moment the epoch closed.
    pub agreed_count: u64,
    /// Tentative tallies per witness at the moment the epoch closed.
    pub witnesses: HashMap<String, u64>,
    /// When the closed epoch began.
    pub epoch_start: DateTime<Utc>,
    /// Rates over the closed epoch.
    pub rate: JokeRate,
    /// When the snapshot was taken; also the start of the next epoch.
    pub taken_at: DateTime<Utc>,
}

/// The quorum counter: bounded witness table, agreed count, epoch start.
#[derive(Debug, Clone)]
pub struct CounterState {
    max_witnesses: usize,
    witnesses: HashMap<String, u64>,
    agreed_count: u64,
    epoch_start: DateTime<Utc>,
}

impl CounterState {
    #[must_use]
    pub fn new(max_witnesses: usize, now: DateTime<Utc>) -> Self {
        Self {
            max_witnesses,
            witnesses: HashMap::new(),
            agreed_count: 0,
            epoch_start: now,
        }
    }

    /// Records one vote from `witness_id`.
    ///
    /// A first-time witness is seeded at the current agreed count, so its
    /// first vote lands exactly one ahead of the table. The voter's own tally
    /// counts toward the quorum, which means a fresh second witness can
    /// confirm a pending value with a single vote.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::WitnessLimitExceeded`] if `witness_id` is
    /// unknown and the table is full. Nothing is mutated in that case.
    pub fn vote(
        &mut self,
        witness_id: &str,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome, CounterError> {
        if !self.witnesses.contains_key(witness_id) && self.witnesses.len() >= self.max_witnesses {
            return Err(CounterError::WitnessLimitExceeded);
        }

        let tally = self.witnesses.entry(witness_id.to_string()).or_insert(self.agreed_count);
        *tally += 1;
        let new_count = *tally;

        let agreeing = self.witnesses.values().filter(|&&t| t >= new_count).count();

        let advanced = agreeing >= AGREEMENT_QUORUM && new_count > self.agreed_count;
        if advanced {
            self.agreed_count = new_count;
            for tally in self.witnesses.values_mut() {
                if *tally < new_count {
                    *tally = new_count;
                }
            }
        }

        Ok(VoteOutcome {
            agreed_count: self.agreed_count,
            witness_count: new_count,
            advanced,
            rate: joke_rate(self.agreed_count, self.epoch_start, now),
        })
    }

    /// Zeroes `witness_id`'s tally; unknown witnesses are a no-op.
    ///
    /// Once [`AGREEMENT_QUORUM`] tallies sit at zero, every tally and the
    /// agreed count reset and the epoch restarts at `now`. The zero tallies
    /// counted toward the quorum need not come from this call.
    pub fn reset(&mut self, witness_id: &str, now: DateTime<Utc>) -> ResetOutcome {
        if let Some(tally) = self.witnesses.get_mut(witness_id) {
            *tally = 0;
        }

        let zeroed = self.witnesses.values().filter(|&&t| t == 0).count();
        let reset_all = zeroed >= AGREEMENT_QUORUM;
        if reset_all {
            for tally in self.witnesses.values_mut() {
                *tally = 0;
            }
            self.agreed_count = 0;
            self.epoch_start = now;
        }

        ResetOutcome {
            reset_all,
            rate: joke_rate(self.agreed_count, self.epoch_start, now),
        }
    }

    /// Captures the epoch for reporting, then unconditionally starts a new
    /// one: agreed count and every tally drop to zero, witnesses stay known.
    ///
    /// This is the reporting path, not the quorum reset; no agreement is
    /// required.
    pub fn snapshot_and_roll_epoch(&mut self, now: DateTime<Utc>) -> EpochSnapshot {
        let snapshot = EpochSnapshot {
            agreed_count: self.agreed_count,
            witnesses: self.witnesses.clone(),
            epoch_start: self.epoch_start,
            rate: joke_rate(self.agreed_count, self.epoch_start, now),
            taken_at: now,
        };

        self.agreed_count = 0;
        for tally in self.witnesses.values_mut() {
            *tally = 0;
        }
        self.epoch_start = now;

        snapshot
    }

    #[must_use]
    pub fn agreed_count(&self) -> u64 {
        self.agreed_count
    }

    /// Number of distinct witnesses the counter has seen this process.
    #[must_use]
    pub fn witness_len(&self) -> usize {
        self.witnesses.len()
    }

    #[must_use]
    pub fn witness_tally(&self, witness_id: &str) -> Option<u64> {
        self.witnesses.get(witness_id).copied()
    }

    #[must_use]
    pub fn epoch_start(&self) -> DateTime<Utc> {
        self.epoch_start
    }

    #[must_use]
    pub fn rate(&self, now: DateTime<Utc>) -> JokeRate {
        joke_rate(self.agreed_count, self.epoch_start, now)
    }
}
