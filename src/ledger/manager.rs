//! User-facing ledger surface.

use std::sync::Arc;

use crate::db::repository::LedgerStore;
use crate::identity::Identity;

use super::errors::LedgerResult;
use super::models::LedgerEntry;

/// Ledger manager
///
/// Read surface over the [`LedgerStore`] for the calling account. All
/// mutations go through the enrollment, withdrawal, and admin services.
#[derive(Clone)]
pub struct LedgerManager {
    store: Arc<dyn LedgerStore>,
}

impl LedgerManager {
    /// Create a new ledger manager over a store backend
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Current coin balance of the calling account
    pub async fn balance(&self, identity: &Identity) -> LedgerResult<i64> {
        self.store.balance(identity.account_id).await
    }

    /// Most recent ledger entries of the calling account, newest first
    pub async fn history(&self, identity: &Identity, limit: i64) -> LedgerResult<Vec<LedgerEntry>> {
        self.store.entries(identity.account_id, limit).await
    }
}
