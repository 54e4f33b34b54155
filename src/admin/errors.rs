//! Admin gateway error types.

use thiserror::Error;

use crate::ledger::LedgerError;
use crate::rooms::RoomError;
use crate::withdrawal::WithdrawalError;

/// Admin gateway errors
#[derive(Debug, Error)]
pub enum AdminError {
    /// Caller does not hold the administrator role
    #[error("Administrator role required")]
    AdminRequired,

    /// Grant amount must be positive
    #[error("Invalid grant amount: {0}")]
    InvalidAmount(i64),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Withdrawal(#[from] WithdrawalError),
}

/// Result type for admin gateway operations
pub type AdminResult<T> = Result<T, AdminError>;
