//! Withdrawal error types.

use thiserror::Error;

use crate::db::timeouts::TimeoutError;
use crate::ledger::LedgerError;

use super::models::{ParseStatusError, RequestId, WithdrawalStatus};

/// Withdrawal errors
#[derive(Debug, Error)]
pub enum WithdrawalError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store operation exceeded its deadline
    #[error("Withdrawal query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Ledger rejected the debit (insufficient funds, missing account)
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Requested amount must be positive
    #[error("Invalid withdrawal amount: {0}")]
    InvalidAmount(i64),

    /// Payout destination is empty
    #[error("Payout destination must not be empty")]
    EmptyDestination,

    /// No request with this id
    #[error("Withdrawal request not found: {0}")]
    RequestNotFound(RequestId),

    /// Operation requires a different lifecycle state; no state change
    /// occurred
    #[error("Request {request_id} is {status}, not pending")]
    InvalidStateTransition {
        request_id: RequestId,
        status: WithdrawalStatus,
    },

    /// Settlement evidence reference is empty
    #[error("Settlement evidence reference must not be empty")]
    MissingEvidence,

    /// Store-level failure outside the database driver
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<TimeoutError> for WithdrawalError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => WithdrawalError::Timeout(duration),
            TimeoutError::Database(err) => WithdrawalError::Database(err),
        }
    }
}

impl From<ParseStatusError> for WithdrawalError {
    fn from(err: ParseStatusError) -> Self {
        WithdrawalError::TransactionFailed(err.to_string())
    }
}

/// Result type for withdrawal operations
pub type WithdrawalResult<T> = Result<T, WithdrawalError>;
