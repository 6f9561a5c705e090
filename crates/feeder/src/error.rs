//! Feeder error taxonomy.
//!
//! Timeout expiry of a bounded acquisition is NOT represented here - it is a
//! normal `Ok(None)` outcome, so callers can tell "try again later" apart
//! from cancellation and misuse.

#[derive(Debug, thiserror::Error)]
pub enum FeederError {
    /// Invalid permit counts at construction. Fatal, never retried.
    #[error("Invalid feeder configuration: {0}")]
    Config(String),

    /// The caller's cancellation fired before a permit was obtained.
    /// Guaranteed not to have consumed a permit.
    #[error("Acquisition cancelled before a permit was obtained")]
    Cancelled,

    /// Acquisition attempted on a feeder that has been disposed.
    #[error("Feeder has been disposed")]
    Disposed,

    /// `dispose()` called while tokens are still live. The feeder is left
    /// untouched; release the tokens first.
    #[error("Cannot dispose feeder: {0} token(s) still live")]
    TokensOutstanding(usize),
}

impl FeederError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FeederError::Cancelled)
    }
}
