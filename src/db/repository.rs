//! Store trait definitions.
//!
//! Every durable operation the services perform goes through these
//! traits, so the same service code runs against PostgreSQL
//! ([`postgres`](super::postgres)) or in process
//! ([`memory`](super::memory)), and tests can wrap a backend to inject
//! faults at any seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::enrollment::{Enrollment, EnrollmentResult};
use crate::identity::AccountId;
use crate::ledger::{AccountBalance, EntryKind, LedgerEntry, LedgerResult};
use crate::rooms::{Room, RoomId, RoomResult};
use crate::withdrawal::{RequestId, WithdrawalRequest, WithdrawalResult};

/// Trait for the coin ledger store.
///
/// [`adjust`](LedgerStore::adjust) is the single mutation primitive:
/// every debit and credit in the system is one atomic conditional
/// adjustment, serialized per account. Implementations must never expose
/// a read-then-write path.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Provision a balance row for an account with its initial coins.
    ///
    /// Records a `Provision` entry so the conservation invariant holds
    /// from the first coin. Fails with `AccountExists` if the account is
    /// already provisioned and `InvalidAmount` if `initial_coins` is
    /// negative.
    async fn open_account(
        &self,
        account_id: AccountId,
        initial_coins: i64,
    ) -> LedgerResult<AccountBalance>;

    /// Current balance for an account
    async fn balance(&self, account_id: AccountId) -> LedgerResult<i64>;

    /// Atomically apply a signed delta to an account balance.
    ///
    /// If `delta < 0` and the balance cannot cover it, fails with
    /// `InsufficientFunds` and leaves the balance unchanged; the failed
    /// call is rejected up front, never applied and reversed. On success
    /// the movement and the resulting balance are recorded as a ledger
    /// entry in the same atomic unit, and the new balance is returned.
    ///
    /// Concurrent calls for the same account serialize; calls for
    /// unrelated accounts proceed in parallel.
    async fn adjust(
        &self,
        account_id: AccountId,
        delta: i64,
        kind: EntryKind,
        reference: Option<Uuid>,
    ) -> LedgerResult<i64>;

    /// Most recent entries for an account, newest first
    async fn entries(&self, account_id: AccountId, limit: i64) -> LedgerResult<Vec<LedgerEntry>>;
}

/// Trait for the room registry store
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Persist a new room
    async fn insert(&self, room: &Room) -> RoomResult<()>;

    /// Fetch a room by id, credentials included.
    ///
    /// Crate-internal: public surfaces only ever hand out the
    /// credential-free listing projection.
    async fn get(&self, room_id: RoomId) -> RoomResult<Room>;

    /// All active rooms, newest first
    async fn list_active(&self) -> RoomResult<Vec<Room>>;
}

/// Trait for the enrollment store
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Persist a membership record.
    ///
    /// The (account, room) pair is unique; a second insert for the same
    /// pair fails with `DuplicateEnrollment`. The check and the insert
    /// are one atomic operation, not a prior read.
    async fn insert(&self, enrollment: &Enrollment) -> EnrollmentResult<()>;

    /// Membership record for an (account, room) pair, if any
    async fn find(
        &self,
        account_id: AccountId,
        room_id: RoomId,
    ) -> EnrollmentResult<Option<Enrollment>>;

    /// All memberships for a room, oldest first
    async fn list_for_room(&self, room_id: RoomId) -> EnrollmentResult<Vec<Enrollment>>;

    /// All memberships for an account, oldest first
    async fn list_for_account(&self, account_id: AccountId) -> EnrollmentResult<Vec<Enrollment>>;
}

/// Trait for the withdrawal request store
#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    /// Persist a new pending request
    async fn insert(&self, request: &WithdrawalRequest) -> WithdrawalResult<()>;

    /// Fetch a request by id
    async fn get(&self, request_id: RequestId) -> WithdrawalResult<WithdrawalRequest>;

    /// Transition a request `pending -> approved`, stamping the evidence
    /// and processed timestamp.
    ///
    /// The transition is conditional on the pending state: approving an
    /// already-approved request fails with `InvalidStateTransition` and
    /// writes nothing.
    async fn approve(
        &self,
        request_id: RequestId,
        settlement_ref: &str,
        processed_at: DateTime<Utc>,
    ) -> WithdrawalResult<WithdrawalRequest>;

    /// All requests for an account, newest first
    async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> WithdrawalResult<Vec<WithdrawalRequest>>;

    /// All pending requests, oldest first
    async fn list_pending(&self) -> WithdrawalResult<Vec<WithdrawalRequest>>;
}
