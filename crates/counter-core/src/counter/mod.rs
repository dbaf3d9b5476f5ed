//! Quorum counter: state machine, shared service handle, and errors.

pub mod errors;
pub mod service;
pub mod state;

pub use errors::CounterError;
pub use service::{CounterStatus, JokeCounter};
pub use state::{CounterState, EpochSnapshot, ResetOutcome, VoteOutcome, AGREEMENT_QUORUM};
