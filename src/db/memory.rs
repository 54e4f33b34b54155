//! In-memory store implementations.
//!
//! Backend for tests and embedded use. The ledger keeps one mutex per
//! account so concurrent adjustments to one account serialize while
//! unrelated accounts proceed in parallel; the outer registry lock is
//! only held to look up or create a cell, never across an await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::enrollment::{Enrollment, EnrollmentError, EnrollmentResult};
use crate::identity::AccountId;
use crate::ledger::{AccountBalance, EntryKind, LedgerEntry, LedgerError, LedgerResult};
use crate::rooms::{Room, RoomError, RoomId, RoomResult};
use crate::withdrawal::{
    RequestId, WithdrawalError, WithdrawalRequest, WithdrawalResult, WithdrawalStatus,
};

use super::repository::{EnrollmentStore, LedgerStore, RoomStore, WithdrawalStore};

fn poisoned<T>(_: PoisonError<T>) -> String {
    "store lock poisoned".to_string()
}

/// Balance and entry log for one account
struct AccountCell {
    balance: AccountBalance,
    entries: Vec<LedgerEntry>,
}

/// In-memory ledger store
#[derive(Default)]
pub struct MemoryLedgerStore {
    accounts: RwLock<HashMap<AccountId, Arc<Mutex<AccountCell>>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, account_id: AccountId) -> LedgerResult<Arc<Mutex<AccountCell>>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| LedgerError::TransactionFailed(poisoned(e)))?;
        accounts
            .get(&account_id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(account_id))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn open_account(
        &self,
        account_id: AccountId,
        initial_coins: i64,
    ) -> LedgerResult<AccountBalance> {
        if initial_coins < 0 {
            return Err(LedgerError::InvalidAmount(initial_coins));
        }

        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| LedgerError::TransactionFailed(poisoned(e)))?;
        if accounts.contains_key(&account_id) {
            return Err(LedgerError::AccountExists(account_id));
        }

        let now = Utc::now();
        let balance = AccountBalance {
            account_id,
            coins: initial_coins,
            created_at: now,
            updated_at: now,
        };
        let cell = AccountCell {
            balance: balance.clone(),
            entries: vec![LedgerEntry {
                id: Uuid::new_v4(),
                account_id,
                amount: initial_coins,
                balance_after: initial_coins,
                kind: EntryKind::Provision,
                reference: None,
                created_at: now,
            }],
        };
        accounts.insert(account_id, Arc::new(Mutex::new(cell)));
        Ok(balance)
    }

    async fn balance(&self, account_id: AccountId) -> LedgerResult<i64> {
        let cell = self.cell(account_id)?;
        let cell = cell
            .lock()
            .map_err(|e| LedgerError::TransactionFailed(poisoned(e)))?;
        Ok(cell.balance.coins)
    }

    async fn adjust(
        &self,
        account_id: AccountId,
        delta: i64,
        kind: EntryKind,
        reference: Option<Uuid>,
    ) -> LedgerResult<i64> {
        let cell = self.cell(account_id)?;
        let mut cell = cell
            .lock()
            .map_err(|e| LedgerError::TransactionFailed(poisoned(e)))?;

        let available = cell.balance.coins;
        let new_balance = available
            .checked_add(delta)
            .ok_or(LedgerError::BalanceOverflow)?;
        if new_balance < 0 {
            return Err(LedgerError::InsufficientFunds {
                available,
                required: -delta,
            });
        }

        let now = Utc::now();
        cell.balance.coins = new_balance;
        cell.balance.updated_at = now;
        cell.entries.push(LedgerEntry {
            id: Uuid::new_v4(),
            account_id,
            amount: delta,
            balance_after: new_balance,
            kind,
            reference,
            created_at: now,
        });
        Ok(new_balance)
    }

    async fn entries(&self, account_id: AccountId, limit: i64) -> LedgerResult<Vec<LedgerEntry>> {
        let cell = self.cell(account_id)?;
        let cell = cell
            .lock()
            .map_err(|e| LedgerError::TransactionFailed(poisoned(e)))?;
        Ok(cell
            .entries
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

/// In-memory room store
#[derive(Default)]
pub struct MemoryRoomStore {
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn insert(&self, room: &Room) -> RoomResult<()> {
        let mut rooms = self
            .rooms
            .write()
            .map_err(|e| RoomError::TransactionFailed(poisoned(e)))?;
        rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn get(&self, room_id: RoomId) -> RoomResult<Room> {
        let rooms = self
            .rooms
            .read()
            .map_err(|e| RoomError::TransactionFailed(poisoned(e)))?;
        rooms
            .get(&room_id)
            .cloned()
            .ok_or(RoomError::NotFound(room_id))
    }

    async fn list_active(&self) -> RoomResult<Vec<Room>> {
        let rooms = self
            .rooms
            .read()
            .map_err(|e| RoomError::TransactionFailed(poisoned(e)))?;
        let mut active: Vec<Room> = rooms.values().filter(|r| r.is_active).cloned().collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }
}

/// In-memory enrollment store.
///
/// The (account, room) uniqueness check and the insert happen under one
/// lock, mirroring the composite unique constraint of the Postgres
/// backend.
#[derive(Default)]
pub struct MemoryEnrollmentStore {
    enrollments: Mutex<HashMap<(AccountId, RoomId), Enrollment>>,
}

impl MemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnrollmentStore for MemoryEnrollmentStore {
    async fn insert(&self, enrollment: &Enrollment) -> EnrollmentResult<()> {
        let mut enrollments = self
            .enrollments
            .lock()
            .map_err(|e| EnrollmentError::TransactionFailed(poisoned(e)))?;
        let key = (enrollment.account_id, enrollment.room_id);
        if enrollments.contains_key(&key) {
            return Err(EnrollmentError::DuplicateEnrollment {
                account_id: enrollment.account_id,
                room_id: enrollment.room_id,
            });
        }
        enrollments.insert(key, enrollment.clone());
        Ok(())
    }

    async fn find(
        &self,
        account_id: AccountId,
        room_id: RoomId,
    ) -> EnrollmentResult<Option<Enrollment>> {
        let enrollments = self
            .enrollments
            .lock()
            .map_err(|e| EnrollmentError::TransactionFailed(poisoned(e)))?;
        Ok(enrollments.get(&(account_id, room_id)).cloned())
    }

    async fn list_for_room(&self, room_id: RoomId) -> EnrollmentResult<Vec<Enrollment>> {
        let enrollments = self
            .enrollments
            .lock()
            .map_err(|e| EnrollmentError::TransactionFailed(poisoned(e)))?;
        let mut members: Vec<Enrollment> = enrollments
            .values()
            .filter(|e| e.room_id == room_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.enrolled_at.cmp(&b.enrolled_at));
        Ok(members)
    }

    async fn list_for_account(&self, account_id: AccountId) -> EnrollmentResult<Vec<Enrollment>> {
        let enrollments = self
            .enrollments
            .lock()
            .map_err(|e| EnrollmentError::TransactionFailed(poisoned(e)))?;
        let mut memberships: Vec<Enrollment> = enrollments
            .values()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect();
        memberships.sort_by(|a, b| a.enrolled_at.cmp(&b.enrolled_at));
        Ok(memberships)
    }
}

/// In-memory withdrawal request store
#[derive(Default)]
pub struct MemoryWithdrawalStore {
    requests: Mutex<HashMap<RequestId, WithdrawalRequest>>,
}

impl MemoryWithdrawalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WithdrawalStore for MemoryWithdrawalStore {
    async fn insert(&self, request: &WithdrawalRequest) -> WithdrawalResult<()> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|e| WithdrawalError::TransactionFailed(poisoned(e)))?;
        requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn get(&self, request_id: RequestId) -> WithdrawalResult<WithdrawalRequest> {
        let requests = self
            .requests
            .lock()
            .map_err(|e| WithdrawalError::TransactionFailed(poisoned(e)))?;
        requests
            .get(&request_id)
            .cloned()
            .ok_or(WithdrawalError::RequestNotFound(request_id))
    }

    async fn approve(
        &self,
        request_id: RequestId,
        settlement_ref: &str,
        processed_at: DateTime<Utc>,
    ) -> WithdrawalResult<WithdrawalRequest> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|e| WithdrawalError::TransactionFailed(poisoned(e)))?;
        let request = requests
            .get_mut(&request_id)
            .ok_or(WithdrawalError::RequestNotFound(request_id))?;

        if request.status != WithdrawalStatus::Pending {
            return Err(WithdrawalError::InvalidStateTransition {
                request_id,
                status: request.status,
            });
        }

        request.status = WithdrawalStatus::Approved;
        request.settlement_ref = Some(settlement_ref.to_string());
        request.processed_at = Some(processed_at);
        Ok(request.clone())
    }

    async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> WithdrawalResult<Vec<WithdrawalRequest>> {
        let requests = self
            .requests
            .lock()
            .map_err(|e| WithdrawalError::TransactionFailed(poisoned(e)))?;
        let mut history: Vec<WithdrawalRequest> = requests
            .values()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(history)
    }

    async fn list_pending(&self) -> WithdrawalResult<Vec<WithdrawalRequest>> {
        let requests = self
            .requests
            .lock()
            .map_err(|e| WithdrawalError::TransactionFailed(poisoned(e)))?;
        let mut pending: Vec<WithdrawalRequest> = requests
            .values()
            .filter(|r| r.status == WithdrawalStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_account_records_provision_entry() {
        let store = MemoryLedgerStore::new();
        let account_id = Uuid::new_v4();

        let balance = store.open_account(account_id, 500).await.unwrap();
        assert_eq!(balance.coins, 500);

        let entries = store.entries(account_id, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::Provision);
        assert_eq!(entries[0].amount, 500);
        assert_eq!(entries[0].balance_after, 500);
    }

    #[tokio::test]
    async fn reopening_an_account_fails() {
        let store = MemoryLedgerStore::new();
        let account_id = Uuid::new_v4();

        store.open_account(account_id, 100).await.unwrap();
        let err = store.open_account(account_id, 100).await.unwrap_err();
        assert!(matches!(err, LedgerError::AccountExists(id) if id == account_id));
    }

    #[tokio::test]
    async fn adjust_rejects_overdraft_without_applying() {
        let store = MemoryLedgerStore::new();
        let account_id = Uuid::new_v4();
        store.open_account(account_id, 100).await.unwrap();

        let err = store
            .adjust(account_id, -150, EntryKind::Withdrawal, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds {
                available: 100,
                required: 150
            }
        ));
        assert_eq!(store.balance(account_id).await.unwrap(), 100);
        // The rejected call leaves no entry behind
        assert_eq!(store.entries(account_id, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn adjust_guards_against_overflow() {
        let store = MemoryLedgerStore::new();
        let account_id = Uuid::new_v4();
        store.open_account(account_id, i64::MAX - 10).await.unwrap();

        let err = store
            .adjust(account_id, 100, EntryKind::Grant, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow));
        assert_eq!(store.balance(account_id).await.unwrap(), i64::MAX - 10);
    }

    #[tokio::test]
    async fn duplicate_enrollment_insert_is_rejected() {
        let store = MemoryEnrollmentStore::new();
        let account_id = Uuid::new_v4();
        let room_id = Uuid::new_v4();

        store
            .insert(&Enrollment::new(account_id, room_id, "player_one"))
            .await
            .unwrap();
        let err = store
            .insert(&Enrollment::new(account_id, room_id, "player_one"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EnrollmentError::DuplicateEnrollment { .. }
        ));

        let members = store.list_for_room(room_id).await.unwrap();
        assert_eq!(members.len(), 1, "Exactly one membership survives");
    }

    #[tokio::test]
    async fn approve_is_conditional_on_pending() {
        let store = MemoryWithdrawalStore::new();
        let request = WithdrawalRequest::new(Uuid::new_v4(), 300, "gpay:123");
        store.insert(&request).await.unwrap();

        let approved = store
            .approve(request.id, "receipt-1", Utc::now())
            .await
            .unwrap();
        assert_eq!(approved.status, WithdrawalStatus::Approved);
        assert_eq!(approved.settlement_ref.as_deref(), Some("receipt-1"));
        assert!(approved.processed_at.is_some());

        let err = store
            .approve(request.id, "receipt-2", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WithdrawalError::InvalidStateTransition { .. }
        ));

        // The first evidence write is untouched
        let stored = store.get(request.id).await.unwrap();
        assert_eq!(stored.settlement_ref.as_deref(), Some("receipt-1"));
    }
}
