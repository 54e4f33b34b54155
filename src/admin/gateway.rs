//! Admin gateway implementation.

use std::sync::Arc;

use chrono::Utc;

use crate::db::repository::{LedgerStore, RoomStore, WithdrawalStore};
use crate::identity::{AccountId, Identity};
use crate::ledger::EntryKind;
use crate::rooms::{NewRoom, Room};
use crate::withdrawal::{RequestId, WithdrawalError, WithdrawalRequest};

use super::errors::{AdminError, AdminResult};

/// Admin gateway
#[derive(Clone)]
pub struct AdminGateway {
    ledger: Arc<dyn LedgerStore>,
    rooms: Arc<dyn RoomStore>,
    withdrawals: Arc<dyn WithdrawalStore>,
}

impl AdminGateway {
    /// Create a new gateway over store backends
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        rooms: Arc<dyn RoomStore>,
        withdrawals: Arc<dyn WithdrawalStore>,
    ) -> Self {
        Self {
            ledger,
            rooms,
            withdrawals,
        }
    }

    fn require_admin(identity: &Identity) -> AdminResult<()> {
        if identity.is_admin() {
            Ok(())
        } else {
            Err(AdminError::AdminRequired)
        }
    }

    /// Confirm that an external payout was made and finalize the request.
    ///
    /// The funds were already debited at request time; approval only
    /// certifies the settlement and stamps the processed timestamp. The
    /// transition is a conditional update on the pending state, so a
    /// second approval fails without touching the stored evidence.
    ///
    /// # Errors
    ///
    /// * `AdminError::AdminRequired` - Caller is not an administrator
    /// * `WithdrawalError::MissingEvidence` - Empty settlement reference
    /// * `WithdrawalError::RequestNotFound` - No request with this id
    /// * `WithdrawalError::InvalidStateTransition` - Request already approved
    pub async fn approve_withdrawal(
        &self,
        identity: &Identity,
        request_id: RequestId,
        settlement_ref: &str,
    ) -> AdminResult<WithdrawalRequest> {
        Self::require_admin(identity)?;
        if settlement_ref.trim().is_empty() {
            return Err(WithdrawalError::MissingEvidence.into());
        }

        let approved = self
            .withdrawals
            .approve(request_id, settlement_ref, Utc::now())
            .await?;
        log::info!(
            "Administrator {} approved withdrawal {} for account {} ({} coins)",
            identity.account_id,
            request_id,
            approved.account_id,
            approved.amount
        );
        Ok(approved)
    }

    /// The approval queue: pending requests, oldest first
    pub async fn pending_withdrawals(
        &self,
        identity: &Identity,
    ) -> AdminResult<Vec<WithdrawalRequest>> {
        Self::require_admin(identity)?;
        Ok(self.withdrawals.list_pending().await?)
    }

    /// Create a game room with its access credentials.
    ///
    /// # Errors
    ///
    /// * `AdminError::AdminRequired` - Caller is not an administrator
    /// * `RoomError::InvalidEntryFee` - Entry fee is negative
    pub async fn create_room(&self, identity: &Identity, params: NewRoom) -> AdminResult<Room> {
        Self::require_admin(identity)?;

        let room = Room::new(params)?;
        self.rooms.insert(&room).await?;
        log::info!(
            "Administrator {} created room {} '{}' (fee {})",
            identity.account_id,
            room.id,
            room.title,
            room.entry_fee
        );
        Ok(room)
    }

    /// Credit coins to an account (top-up).
    ///
    /// # Errors
    ///
    /// * `AdminError::AdminRequired` - Caller is not an administrator
    /// * `AdminError::InvalidAmount` - Amount is zero or negative
    /// * `LedgerError::AccountNotFound` - No balance row for the account
    pub async fn grant_coins(
        &self,
        identity: &Identity,
        account_id: AccountId,
        amount: i64,
    ) -> AdminResult<i64> {
        Self::require_admin(identity)?;
        if amount <= 0 {
            return Err(AdminError::InvalidAmount(amount));
        }

        let new_balance = self
            .ledger
            .adjust(account_id, amount, EntryKind::Grant, None)
            .await?;
        log::info!(
            "Administrator {} granted {} coins to account {} (balance {})",
            identity.account_id,
            amount,
            account_id,
            new_balance
        );
        Ok(new_balance)
    }
}
