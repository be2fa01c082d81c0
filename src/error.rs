//! Errors
//!
//! A failed compare-and-set is not an error; it is how a lost race is
//! reported. The only failure surfaced as an error is a retry loop that gave up.

/// Crate error
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// A [Bounded](crate::retry::Bounded) retry policy ran out of attempts
    #[error("compare-and-set lost {attempts} consecutive races; retry budget exhausted")]
    RetriesExhausted {
        /// Number of lost races, including the last one
        attempts: u32,
    },
}

/// Result with the crate [Error]
pub type Result<T, E = Error> = core::result::Result<T, E>;
