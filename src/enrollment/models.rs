//! Enrollment data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::AccountId;
use crate::rooms::RoomId;

/// Membership record for one (account, room) pair.
///
/// At most one exists per pair; created exactly once when an enrollment
/// transaction commits, never mutated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub account_id: AccountId,
    pub room_id: RoomId,
    pub player_handle: String,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    /// Build a fresh enrollment record, stamped now
    pub fn new(account_id: AccountId, room_id: RoomId, player_handle: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            room_id,
            player_handle: player_handle.to_string(),
            enrolled_at: Utc::now(),
        }
    }
}
