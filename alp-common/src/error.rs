//! Common error types for ALP

use thiserror::Error;

use crate::models::LedgerStatus;

/// Common result type for ALP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy of the licensing engine
///
/// An idempotent commit replay is not an error; it is reported through
/// [`crate::settlement::CommitDisposition::Replayed`].
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed arguments; fixable by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Repasse and comissão do not reconcile to exactly 1
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Referenced item, athlete or ledger entry is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller role does not permit the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Storage unavailable or conflicting (wraps sqlx::Error)
    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Illegal ledger status change
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: LedgerStatus, to: LedgerStatus },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
