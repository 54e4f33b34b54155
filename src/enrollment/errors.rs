//! Enrollment error types.

use thiserror::Error;

use crate::db::timeouts::TimeoutError;
use crate::identity::AccountId;
use crate::ledger::LedgerError;
use crate::rooms::{RoomError, RoomId};

/// Enrollment errors
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store operation exceeded its deadline
    #[error("Enrollment query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Ledger rejected the fee movement (insufficient funds, missing
    /// account, overflow)
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Room does not exist
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// Room exists but is not accepting enrollments
    #[error("Room is not active: {0}")]
    RoomInactive(RoomId),

    /// The (account, room) pair is already enrolled
    #[error("Account {account_id} is already enrolled in room {room_id}")]
    DuplicateEnrollment {
        account_id: AccountId,
        room_id: RoomId,
    },

    /// Credentials requested without a membership
    #[error("Account {account_id} is not enrolled in room {room_id}")]
    NotEnrolled {
        account_id: AccountId,
        room_id: RoomId,
    },

    /// Player handle is empty
    #[error("Player handle must not be empty")]
    InvalidPlayerHandle,

    /// Store-level failure outside the database driver
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<RoomError> for EnrollmentError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::NotFound(room_id) => EnrollmentError::RoomNotFound(room_id),
            RoomError::Database(err) => EnrollmentError::Database(err),
            RoomError::Timeout(duration) => EnrollmentError::Timeout(duration),
            RoomError::InvalidEntryFee(fee) => {
                // Rooms with a negative fee cannot be created, so a lookup
                // can never produce this; treat it as a store fault.
                EnrollmentError::TransactionFailed(format!("invalid entry fee on room: {fee}"))
            }
            RoomError::TransactionFailed(msg) => EnrollmentError::TransactionFailed(msg),
        }
    }
}

impl From<TimeoutError> for EnrollmentError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => EnrollmentError::Timeout(duration),
            TimeoutError::Database(err) => EnrollmentError::Database(err),
        }
    }
}

/// Result type for enrollment operations
pub type EnrollmentResult<T> = Result<T, EnrollmentError>;
