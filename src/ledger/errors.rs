//! Ledger error types.

use thiserror::Error;

use crate::db::timeouts::TimeoutError;
use crate::identity::AccountId;
use crate::ledger::models::ParseEntryKindError;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Underlying store unavailable or transaction aborted
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store operation exceeded its deadline
    #[error("Ledger query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Balance too low for the requested debit; balance left unchanged
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: i64, required: i64 },

    /// No balance row for the account
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account already provisioned
    #[error("Account already exists: {0}")]
    AccountExists(AccountId),

    /// Credit would overflow the balance
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Amount outside the operation's domain
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Store-level failure outside the database driver (memory backend,
    /// injected faults)
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<TimeoutError> for LedgerError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => LedgerError::Timeout(duration),
            TimeoutError::Database(err) => LedgerError::Database(err),
        }
    }
}

impl From<ParseEntryKindError> for LedgerError {
    fn from(err: ParseEntryKindError) -> Self {
        LedgerError::TransactionFailed(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
