//! Caller identity boundary.
//!
//! Accounts are provisioned and authenticated by an external identity
//! provider; this crate receives an already-authenticated account id and
//! role flag on every call and performs no authentication of its own.

pub mod models;

pub use models::{AccountId, Identity, Role};
