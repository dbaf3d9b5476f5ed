use thiserror::Error;

/// Errors returned by counter operations.
///
/// Unknown witnesses and redundant resets are not errors; the only way a
/// request can fail is by trying to grow the witness table past its bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CounterError {
    /// A first-time witness arrived while the table was already full.
    ///
    /// The display string doubles as the client-facing rejection message, so
    /// it must stay stable.
    #[error("Maximum number of unique IPs reached")]
    WitnessLimitExceeded,
}

impl CounterError {
    /// Returns `true` if the caller can recover by retrying as a witness the
    /// counter already knows.
    #[must_use]
    pub fn is_limit(&self) -> bool {
        matches!(self, Self::WitnessLimitExceeded)
    }
}
