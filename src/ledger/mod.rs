//! Coin ledger: per-account balances and the append-only entry log.
//!
//! Every coin movement in the system goes through the single atomic
//! [`adjust`](crate::db::repository::LedgerStore::adjust) primitive; no
//! caller ever reads a balance, computes a new value, and writes it back.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{LedgerError, LedgerResult};
pub use manager::LedgerManager;
pub use models::{AccountBalance, EntryKind, LedgerEntry};
