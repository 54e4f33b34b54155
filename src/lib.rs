//! # Coinroom
//!
//! Coin ledger and enrollment/withdrawal core for a gaming-room platform.
//!
//! Users hold an integer coin balance, spend coins to enroll in game
//! rooms, and request cash withdrawals that an administrator settles
//! externally and then approves. This crate is the part of that system
//! with real invariants: balances never go negative, fees are deducted
//! exactly once, and withdrawal requests move through a one-way
//! `pending -> approved` lifecycle. It has no UI, performs no
//! authentication, and executes no payments; it is a service library
//! meant to sit behind whatever API layer the embedding system chooses.
//!
//! ## Architecture
//!
//! - [`identity`]: the trusted caller identity (account id + role flag)
//!   handed in by the external identity provider
//! - [`ledger`]: per-account balances and the append-only entry log;
//!   every coin movement is one atomic conditional adjustment
//! - [`rooms`]: the room catalog; public reads never expose room
//!   credentials
//! - [`enrollment`]: spend-to-join with a compensating refund if the
//!   membership insert fails after the fee debit
//! - [`withdrawal`]: debit-at-request withdrawal workflow
//! - [`admin`]: the privileged gateway (approval, room creation, coin
//!   grants), authorized server-side against the role flag
//! - [`db`]: store traits with PostgreSQL and in-memory backends
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use coinroom::admin::AdminGateway;
//! use coinroom::db::repository::LedgerStore;
//! use coinroom::db::{
//!     MemoryEnrollmentStore, MemoryLedgerStore, MemoryRoomStore, MemoryWithdrawalStore,
//! };
//! use coinroom::enrollment::EnrollmentManager;
//! use coinroom::identity::Identity;
//! use coinroom::rooms::NewRoom;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Arc::new(MemoryLedgerStore::new());
//!     let rooms = Arc::new(MemoryRoomStore::new());
//!     let enrollments = Arc::new(MemoryEnrollmentStore::new());
//!     let withdrawals = Arc::new(MemoryWithdrawalStore::new());
//!
//!     let admin = Identity::administrator(uuid::Uuid::new_v4());
//!     let player = Identity::standard(uuid::Uuid::new_v4());
//!     ledger.open_account(player.account_id, 500).await?;
//!
//!     let gateway = AdminGateway::new(ledger.clone(), rooms.clone(), withdrawals.clone());
//!     let room = gateway
//!         .create_room(
//!             &admin,
//!             NewRoom {
//!                 title: "Friday Night Squads".to_string(),
//!                 game: "PUBG".to_string(),
//!                 entry_fee: 200,
//!                 code: "ROOM-4417".to_string(),
//!                 password: "hunter2".to_string(),
//!             },
//!         )
//!         .await?;
//!
//!     let enrollment = EnrollmentManager::new(ledger.clone(), rooms, enrollments);
//!     enrollment.enroll(&player, room.id, "slayer_77").await?;
//!
//!     let credentials = enrollment.room_credentials(&player, room.id).await?;
//!     assert_eq!(credentials.code, "ROOM-4417");
//!     assert_eq!(ledger.balance(player.account_id).await?, 300);
//!     Ok(())
//! }
//! ```

/// Privileged administrator operations.
pub mod admin;
/// Persistence boundary: store traits and backends.
pub mod db;
/// Room enrollment service.
pub mod enrollment;
/// Caller identity boundary.
pub mod identity;
/// Coin ledger.
pub mod ledger;
/// Room catalog.
pub mod rooms;
/// Withdrawal workflow.
pub mod withdrawal;

pub use admin::AdminGateway;
pub use enrollment::EnrollmentManager;
pub use identity::{AccountId, Identity, Role};
pub use ledger::{EntryKind, LedgerManager};
pub use rooms::{NewRoom, RoomCatalog};
pub use withdrawal::WithdrawalManager;
