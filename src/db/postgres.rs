//! PostgreSQL store implementations.
//!
//! The ledger's adjust is one conditional
//! `UPDATE … WHERE coins + delta >= 0 RETURNING coins` with the entry
//! insert in the same transaction, so the balance check and the write
//! are a single atomic operation scoped to the account's row. Uniqueness
//! and state transitions ride on the schema's constraints rather than
//! prior reads.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::enrollment::{Enrollment, EnrollmentError, EnrollmentResult};
use crate::identity::AccountId;
use crate::ledger::{AccountBalance, EntryKind, LedgerEntry, LedgerError, LedgerResult};
use crate::rooms::{Room, RoomCredentials, RoomError, RoomId, RoomResult};
use crate::withdrawal::{
    RequestId, WithdrawalError, WithdrawalRequest, WithdrawalResult, WithdrawalStatus,
};

use super::repository::{EnrollmentStore, LedgerStore, RoomStore, WithdrawalStore};
use super::timeouts::with_default_timeout;

// PostgreSQL numeric_value_out_of_range, raised when a BIGINT column
// overflows
const NUMERIC_OUT_OF_RANGE: &str = "22003";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_out_of_range(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE)
    )
}

/// PostgreSQL ledger store
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: Arc<PgPool>,
}

impl PgLedgerStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn ledger_entry_from_row(row: &PgRow) -> LedgerResult<LedgerEntry> {
    Ok(LedgerEntry {
        id: row.get("id"),
        account_id: row.get("account_id"),
        amount: row.get("amount"),
        balance_after: row.get("balance_after"),
        kind: row.get::<String, _>("kind").parse()?,
        reference: row.get("reference"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn open_account(
        &self,
        account_id: AccountId,
        initial_coins: i64,
    ) -> LedgerResult<AccountBalance> {
        if initial_coins < 0 {
            return Err(LedgerError::InvalidAmount(initial_coins));
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO account_balances (account_id, coins)
            VALUES ($1, $2)
            RETURNING account_id, coins, created_at, updated_at
            "#,
        )
        .bind(account_id)
        .bind(initial_coins)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                LedgerError::AccountExists(account_id)
            } else {
                LedgerError::Database(err)
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, account_id, amount, balance_after, kind, reference)
            VALUES ($1, $2, $3, $4, $5, NULL)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(initial_coins)
        .bind(initial_coins)
        .bind(EntryKind::Provision.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AccountBalance {
            account_id: row.get("account_id"),
            coins: row.get("coins"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn balance(&self, account_id: AccountId) -> LedgerResult<i64> {
        let row = with_default_timeout(
            sqlx::query("SELECT coins FROM account_balances WHERE account_id = $1")
                .bind(account_id)
                .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or(LedgerError::AccountNotFound(account_id))?;

        Ok(row.get("coins"))
    }

    async fn adjust(
        &self,
        account_id: AccountId,
        delta: i64,
        kind: EntryKind,
        reference: Option<Uuid>,
    ) -> LedgerResult<i64> {
        let mut tx = self.pool.begin().await?;

        // Atomic conditional update: the balance check and the write are
        // one statement, serialized on the account's row.
        let updated = sqlx::query(
            r#"
            UPDATE account_balances
            SET coins = coins + $1, updated_at = NOW()
            WHERE account_id = $2 AND coins + $1 >= 0
            RETURNING coins
            "#,
        )
        .bind(delta)
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| {
            if is_out_of_range(&err) {
                LedgerError::BalanceOverflow
            } else {
                LedgerError::Database(err)
            }
        })?;

        let new_balance: i64 = match updated {
            Some(row) => row.get("coins"),
            None => {
                // Either the account is missing or the balance cannot
                // cover the debit; check which.
                let check = sqlx::query("SELECT coins FROM account_balances WHERE account_id = $1")
                    .bind(account_id)
                    .fetch_optional(&mut *tx)
                    .await?;

                return match check {
                    Some(row) => Err(LedgerError::InsufficientFunds {
                        available: row.get("coins"),
                        required: -delta,
                    }),
                    None => Err(LedgerError::AccountNotFound(account_id)),
                };
            }
        };

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, account_id, amount, balance_after, kind, reference)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(delta)
        .bind(new_balance)
        .bind(kind.to_string())
        .bind(reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(new_balance)
    }

    async fn entries(&self, account_id: AccountId, limit: i64) -> LedgerResult<Vec<LedgerEntry>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, account_id, amount, balance_after, kind, reference, created_at
                FROM ledger_entries
                WHERE account_id = $1
                ORDER BY created_at DESC
                LIMIT $2
                "#,
            )
            .bind(account_id)
            .bind(limit)
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        rows.iter().map(ledger_entry_from_row).collect()
    }
}

/// PostgreSQL room store
#[derive(Clone)]
pub struct PgRoomStore {
    pool: Arc<PgPool>,
}

impl PgRoomStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn room_from_row(row: &PgRow) -> Room {
    Room {
        id: row.get("id"),
        title: row.get("title"),
        game: row.get("game"),
        entry_fee: row.get("entry_fee"),
        credentials: RoomCredentials {
            code: row.get("room_code"),
            password: row.get("room_password"),
        },
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn insert(&self, room: &Room) -> RoomResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, title, game, entry_fee, room_code, room_password, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(room.id)
        .bind(&room.title)
        .bind(&room.game)
        .bind(room.entry_fee)
        .bind(&room.credentials.code)
        .bind(&room.credentials.password)
        .bind(room.is_active)
        .bind(room.created_at)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn get(&self, room_id: RoomId) -> RoomResult<Room> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, title, game, entry_fee, room_code, room_password, is_active, created_at
                FROM rooms
                WHERE id = $1
                "#,
            )
            .bind(room_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or(RoomError::NotFound(room_id))?;

        Ok(room_from_row(&row))
    }

    async fn list_active(&self) -> RoomResult<Vec<Room>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, title, game, entry_fee, room_code, room_password, is_active, created_at
                FROM rooms
                WHERE is_active = TRUE
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(rows.iter().map(room_from_row).collect())
    }
}

/// PostgreSQL enrollment store
#[derive(Clone)]
pub struct PgEnrollmentStore {
    pool: Arc<PgPool>,
}

impl PgEnrollmentStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn enrollment_from_row(row: &PgRow) -> Enrollment {
    Enrollment {
        id: row.get("id"),
        account_id: row.get("account_id"),
        room_id: row.get("room_id"),
        player_handle: row.get("player_handle"),
        enrolled_at: row.get("enrolled_at"),
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    async fn insert(&self, enrollment: &Enrollment) -> EnrollmentResult<()> {
        // The composite unique constraint does the duplicate check
        // atomically with the insert.
        sqlx::query(
            r#"
            INSERT INTO enrollments (id, account_id, room_id, player_handle, enrolled_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(enrollment.id)
        .bind(enrollment.account_id)
        .bind(enrollment.room_id)
        .bind(&enrollment.player_handle)
        .bind(enrollment.enrolled_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                EnrollmentError::DuplicateEnrollment {
                    account_id: enrollment.account_id,
                    room_id: enrollment.room_id,
                }
            } else {
                EnrollmentError::Database(err)
            }
        })?;
        Ok(())
    }

    async fn find(
        &self,
        account_id: AccountId,
        room_id: RoomId,
    ) -> EnrollmentResult<Option<Enrollment>> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, account_id, room_id, player_handle, enrolled_at
                FROM enrollments
                WHERE account_id = $1 AND room_id = $2
                "#,
            )
            .bind(account_id)
            .bind(room_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.as_ref().map(enrollment_from_row))
    }

    async fn list_for_room(&self, room_id: RoomId) -> EnrollmentResult<Vec<Enrollment>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, account_id, room_id, player_handle, enrolled_at
                FROM enrollments
                WHERE room_id = $1
                ORDER BY enrolled_at ASC
                "#,
            )
            .bind(room_id)
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(rows.iter().map(enrollment_from_row).collect())
    }

    async fn list_for_account(&self, account_id: AccountId) -> EnrollmentResult<Vec<Enrollment>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, account_id, room_id, player_handle, enrolled_at
                FROM enrollments
                WHERE account_id = $1
                ORDER BY enrolled_at ASC
                "#,
            )
            .bind(account_id)
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(rows.iter().map(enrollment_from_row).collect())
    }
}

/// PostgreSQL withdrawal request store
#[derive(Clone)]
pub struct PgWithdrawalStore {
    pool: Arc<PgPool>,
}

impl PgWithdrawalStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn withdrawal_from_row(row: &PgRow) -> WithdrawalResult<WithdrawalRequest> {
    Ok(WithdrawalRequest {
        id: row.get("id"),
        account_id: row.get("account_id"),
        amount: row.get("amount"),
        destination: row.get("destination"),
        status: row.get::<String, _>("status").parse()?,
        settlement_ref: row.get("settlement_ref"),
        requested_at: row.get("requested_at"),
        processed_at: row.get("processed_at"),
    })
}

#[async_trait]
impl WithdrawalStore for PgWithdrawalStore {
    async fn insert(&self, request: &WithdrawalRequest) -> WithdrawalResult<()> {
        sqlx::query(
            r#"
            INSERT INTO withdrawal_requests
                (id, account_id, amount, destination, status, settlement_ref, requested_at, processed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(request.id)
        .bind(request.account_id)
        .bind(request.amount)
        .bind(&request.destination)
        .bind(request.status.to_string())
        .bind(&request.settlement_ref)
        .bind(request.requested_at)
        .bind(request.processed_at)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn get(&self, request_id: RequestId) -> WithdrawalResult<WithdrawalRequest> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, account_id, amount, destination, status, settlement_ref,
                       requested_at, processed_at
                FROM withdrawal_requests
                WHERE id = $1
                "#,
            )
            .bind(request_id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or(WithdrawalError::RequestNotFound(request_id))?;

        withdrawal_from_row(&row)
    }

    async fn approve(
        &self,
        request_id: RequestId,
        settlement_ref: &str,
        processed_at: DateTime<Utc>,
    ) -> WithdrawalResult<WithdrawalRequest> {
        // Conditional transition: only a pending request is updated, so
        // a second approval matches zero rows and writes nothing.
        let updated = sqlx::query(
            r#"
            UPDATE withdrawal_requests
            SET status = 'approved', settlement_ref = $2, processed_at = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING id, account_id, amount, destination, status, settlement_ref,
                      requested_at, processed_at
            "#,
        )
        .bind(request_id)
        .bind(settlement_ref)
        .bind(processed_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match updated {
            Some(row) => withdrawal_from_row(&row),
            None => {
                // Either the request is missing or it already left the
                // pending state; check which.
                let check = sqlx::query("SELECT status FROM withdrawal_requests WHERE id = $1")
                    .bind(request_id)
                    .fetch_optional(self.pool.as_ref())
                    .await?;

                match check {
                    Some(row) => {
                        let status: WithdrawalStatus = row.get::<String, _>("status").parse()?;
                        Err(WithdrawalError::InvalidStateTransition { request_id, status })
                    }
                    None => Err(WithdrawalError::RequestNotFound(request_id)),
                }
            }
        }
    }

    async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> WithdrawalResult<Vec<WithdrawalRequest>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, account_id, amount, destination, status, settlement_ref,
                       requested_at, processed_at
                FROM withdrawal_requests
                WHERE account_id = $1
                ORDER BY requested_at DESC
                "#,
            )
            .bind(account_id)
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        rows.iter().map(withdrawal_from_row).collect()
    }

    async fn list_pending(&self) -> WithdrawalResult<Vec<WithdrawalRequest>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, account_id, amount, destination, status, settlement_ref,
                       requested_at, processed_at
                FROM withdrawal_requests
                WHERE status = 'pending'
                ORDER BY requested_at ASC
                "#,
            )
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        rows.iter().map(withdrawal_from_row).collect()
    }
}
