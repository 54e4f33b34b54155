//! Room error types.

use thiserror::Error;

use crate::db::timeouts::TimeoutError;

use super::models::RoomId;

/// Room errors
#[derive(Debug, Error)]
pub enum RoomError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store operation exceeded its deadline
    #[error("Room query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Room not found
    #[error("Room not found: {0}")]
    NotFound(RoomId),

    /// Entry fee must be non-negative
    #[error("Invalid entry fee: {0}")]
    InvalidEntryFee(i64),

    /// Store-level failure outside the database driver
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<TimeoutError> for RoomError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => RoomError::Timeout(duration),
            TimeoutError::Database(err) => RoomError::Database(err),
        }
    }
}

/// Result type for room operations
pub type RoomResult<T> = Result<T, RoomError>;
