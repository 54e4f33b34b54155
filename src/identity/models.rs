//! Identity data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account ID type
pub type AccountId = Uuid;

/// Role flag assigned by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Standard,
    Administrator,
}

/// Authenticated caller identity, trusted as-is from the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub account_id: AccountId,
    pub role: Role,
}

impl Identity {
    /// Identity with the standard role
    pub fn standard(account_id: AccountId) -> Self {
        Self {
            account_id,
            role: Role::Standard,
        }
    }

    /// Identity with the administrator role
    pub fn administrator(account_id: AccountId) -> Self {
        Self {
            account_id,
            role: Role::Administrator,
        }
    }

    /// Whether this identity may invoke privileged operations
    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }
}
