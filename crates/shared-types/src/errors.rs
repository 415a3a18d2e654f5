//! # Error Types
//!
//! Errors shared across crates.

use thiserror::Error;

/// Errors produced while parsing or constructing a `UserId`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Zero is reserved and never names an account.
    #[error("user id must be non-zero")]
    Zero,

    /// The input was not an unsigned integer.
    #[error("malformed user id: {0:?}")]
    Malformed(String),
}
