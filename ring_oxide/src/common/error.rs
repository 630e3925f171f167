//! Error types for filter, index, and ring operations

use thiserror::Error;

/// Errors that can occur while constructing or operating a store.
///
/// Capacity exhaustion is deliberately *not* represented here: a saturated
/// cuckoo filter or a full ring reports failure through a `false` return so
/// that callers can degrade gracefully. Errors of this type are either caller
/// mistakes (`InvalidParameter`) or unrecoverable structural breakage
/// (`InvariantViolation`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Invalid parameter provided to a constructor or operation
    #[error("invalid parameter '{param}': value '{value}' {constraint}")]
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Invalid value provided
        value: String,
        /// Constraint that was violated
        constraint: String,
    },

    /// A structural invariant no longer holds. Fatal: no recovery is
    /// attempted and the owning structure should be considered corrupt.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
