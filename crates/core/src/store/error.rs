//! Persistence collaborator errors.

use thiserror::Error;

/// Errors raised by a [`LedgerStore`](super::LedgerStore) implementation.
///
/// When a transaction fails with any of these, nothing it staged is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing storage could not be reached or failed mid-write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write would break a stored invariant.
    #[error("Store conflict: {0}")]
    Conflict(String),

    /// A unique key is already taken.
    #[error("Duplicate key: {0}")]
    Duplicate(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
