//! Withdrawal workflow implementation (request side).

use std::sync::Arc;

use crate::db::repository::{LedgerStore, WithdrawalStore};
use crate::identity::Identity;
use crate::ledger::EntryKind;

use super::errors::{WithdrawalError, WithdrawalResult};
use super::models::WithdrawalRequest;

/// Withdrawal manager
#[derive(Clone)]
pub struct WithdrawalManager {
    ledger: Arc<dyn LedgerStore>,
    withdrawals: Arc<dyn WithdrawalStore>,
}

impl WithdrawalManager {
    /// Create a new withdrawal manager over store backends
    pub fn new(ledger: Arc<dyn LedgerStore>, withdrawals: Arc<dyn WithdrawalStore>) -> Self {
        Self {
            ledger,
            withdrawals,
        }
    }

    /// Reserve funds and create a pending withdrawal request.
    ///
    /// Funds are reserved by debiting immediately; the caller's visible
    /// balance already excludes pending withdrawals. The debit and the
    /// request insert form one logical unit with a compensating credit,
    /// like enrollment.
    ///
    /// # Errors
    ///
    /// * `WithdrawalError::InvalidAmount` - Amount is zero or negative
    /// * `WithdrawalError::EmptyDestination` - No payout destination given
    /// * `WithdrawalError::Ledger` - Insufficient funds; no request is created
    pub async fn request_withdrawal(
        &self,
        identity: &Identity,
        amount: i64,
        destination: &str,
    ) -> WithdrawalResult<WithdrawalRequest> {
        if amount <= 0 {
            return Err(WithdrawalError::InvalidAmount(amount));
        }
        if destination.trim().is_empty() {
            return Err(WithdrawalError::EmptyDestination);
        }

        let account_id = identity.account_id;
        let request = WithdrawalRequest::new(account_id, amount, destination);

        self.ledger
            .adjust(account_id, -amount, EntryKind::Withdrawal, Some(request.id))
            .await?;

        match self.withdrawals.insert(&request).await {
            Ok(()) => {
                log::info!(
                    "Account {} requested withdrawal of {} coins (request {})",
                    account_id,
                    amount,
                    request.id
                );
                Ok(request)
            }
            Err(err) => {
                log::warn!(
                    "Withdrawal insert failed for account {}, refunding {} coins: {}",
                    account_id,
                    amount,
                    err
                );
                if let Err(refund_err) = self
                    .ledger
                    .adjust(account_id, amount, EntryKind::Refund, Some(request.id))
                    .await
                {
                    // The debit stays visible in the entry log for manual
                    // reconciliation.
                    log::error!(
                        "Failed to refund withdrawal debit for account {}: {}",
                        account_id,
                        refund_err
                    );
                }
                Err(err)
            }
        }
    }

    /// The calling account's withdrawal requests, newest first
    pub async fn history(&self, identity: &Identity) -> WithdrawalResult<Vec<WithdrawalRequest>> {
        self.withdrawals
            .list_for_account(identity.account_id)
            .await
    }
}
