//! Withdrawal workflow.
//!
//! A withdrawal reserves funds by debiting the ledger at request time, so
//! the balance a user sees already excludes pending withdrawals. Requests
//! move `pending -> approved` through the admin gateway and never leave
//! that path; there is no rejection or cancellation state.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{WithdrawalError, WithdrawalResult};
pub use manager::WithdrawalManager;
pub use models::{RequestId, WithdrawalRequest, WithdrawalStatus};
