//! Engine construction errors.

use thiserror::Error;

/// Failure to set up a scope engine or one of its parts.
///
/// All of these are boot-time conditions. Nothing on the per-frame or
/// per-tick path returns an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// A table or queue could not be allocated.
    #[error("out of memory allocating {0}")]
    OutOfMemory(&'static str),
    /// The sync queue needs room for at least one entry.
    #[error("sync queue capacity must be non-zero")]
    ZeroCapacity,
    /// Interpolation phase count must be a non-zero power of two.
    #[error("interpolation phase count {0} is not a non-zero power of two")]
    InvalidPhases(usize),
    /// A delta table was requested for a zero rate.
    #[error("invalid table rate {0} Hz")]
    InvalidRate(u32),
}
