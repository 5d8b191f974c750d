//! Operation error taxonomy
//!
//! Every failure an orchestrated call can produce, and its mapping onto the
//! HTTP error envelope. The split matters for rollback semantics:
//! `Validation`/`NotFound`/`InvalidTransition`/`InsufficientFunds` occur
//! before commit and roll the unit of work back completely; `Audit` occurs
//! after commit and fails the request while the write stands.

use crate::store::StorageError;
use crate::utils::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    /// Malformed or out-of-range input
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced entity absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Entity exists but its state does not permit the requested change
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    /// Wallet balance below the requested amount
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Persistence gateway failure
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// Audit log failure after commit; the domain write stands but the
    /// request is reported as failed
    #[error("audit log failure: {0}")]
    Audit(String),
}

pub type OpResult<T> = Result<T, OpError>;

impl From<OpError> for AppError {
    fn from(err: OpError) -> Self {
        match err {
            OpError::Validation(msg) => AppError::Validation(msg),
            OpError::NotFound(msg) => AppError::NotFound(msg),
            OpError::InvalidTransition(msg) => AppError::InvalidTransition(msg),
            OpError::InsufficientFunds(msg) => AppError::InsufficientFunds(msg),
            OpError::Storage(e) => AppError::Storage(e.to_string()),
            OpError::Audit(msg) => AppError::Audit(msg),
        }
    }
}
