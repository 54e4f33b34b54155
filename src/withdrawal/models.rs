//! Withdrawal data models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::AccountId;

/// Withdrawal request ID type
pub type RequestId = Uuid;

/// Withdrawal request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Created, funds debited, awaiting administrator confirmation
    Pending,
    /// Settled externally; terminal
    Approved,
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalStatus::Pending => write!(f, "pending"),
            WithdrawalStatus::Approved => write!(f, "approved"),
        }
    }
}

/// Error parsing a persisted withdrawal status
#[derive(Debug, thiserror::Error)]
#[error("unknown withdrawal status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for WithdrawalStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A user's intent to convert coins into an external payout.
///
/// An `Approved` request always carries a settlement reference and a
/// processed timestamp; a `Pending` request carries neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: RequestId,
    pub account_id: AccountId,
    pub amount: i64,
    /// Payout destination reference, e.g. a payment handle
    pub destination: String,
    pub status: WithdrawalStatus,
    /// Administrator-supplied evidence that the payout was made
    pub settlement_ref: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl WithdrawalRequest {
    /// Build a fresh pending request, stamped now
    pub fn new(account_id: AccountId, amount: i64, destination: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            amount,
            destination: destination.to_string(),
            status: WithdrawalStatus::Pending,
            settlement_ref: None,
            requested_at: Utc::now(),
            processed_at: None,
        }
    }
}
