//! Ledger data models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::AccountId;

/// Coin balance for one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: AccountId,
    pub coins: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One movement in the append-only ledger.
///
/// `amount` is signed: debits are negative, credits positive.
/// `reference` links the entry to the room or withdrawal request that
/// caused it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account_id: AccountId,
    pub amount: i64,
    pub balance_after: i64,
    pub kind: EntryKind,
    pub reference: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Initial balance recorded at account provisioning
    Provision,
    /// Room entry fee debit
    EntryFee,
    /// Withdrawal request debit
    Withdrawal,
    /// Compensating credit after a failed debit-then-insert unit
    Refund,
    /// Administrator top-up credit
    Grant,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Provision => write!(f, "provision"),
            EntryKind::EntryFee => write!(f, "entry_fee"),
            EntryKind::Withdrawal => write!(f, "withdrawal"),
            EntryKind::Refund => write!(f, "refund"),
            EntryKind::Grant => write!(f, "grant"),
        }
    }
}

/// Error parsing a persisted entry kind
#[derive(Debug, thiserror::Error)]
#[error("unknown entry kind: {0}")]
pub struct ParseEntryKindError(pub String);

impl FromStr for EntryKind {
    type Err = ParseEntryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provision" => Ok(EntryKind::Provision),
            "entry_fee" => Ok(EntryKind::EntryFee),
            "withdrawal" => Ok(EntryKind::Withdrawal),
            "refund" => Ok(EntryKind::Refund),
            "grant" => Ok(EntryKind::Grant),
            other => Err(ParseEntryKindError(other.to_string())),
        }
    }
}
