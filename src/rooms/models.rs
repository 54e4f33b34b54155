//! Room data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{RoomError, RoomResult};

/// Room ID type
pub type RoomId = Uuid;

/// Access credentials disclosed only to enrolled members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCredentials {
    pub code: String,
    pub password: String,
}

/// Full room record, including credentials. Crate-internal reads only;
/// the public projection is [`RoomListing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub title: String,
    pub game: String,
    pub entry_fee: i64,
    pub credentials: RoomCredentials,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub title: String,
    pub game: String,
    pub entry_fee: i64,
    pub code: String,
    pub password: String,
}

impl Room {
    /// Build a new active room from creation parameters.
    ///
    /// # Errors
    ///
    /// * `RoomError::InvalidEntryFee` - Entry fee is negative
    pub fn new(params: NewRoom) -> RoomResult<Self> {
        if params.entry_fee < 0 {
            return Err(RoomError::InvalidEntryFee(params.entry_fee));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title: params.title,
            game: params.game,
            entry_fee: params.entry_fee,
            credentials: RoomCredentials {
                code: params.code,
                password: params.password,
            },
            is_active: true,
            created_at: Utc::now(),
        })
    }

    /// Credential-free projection for catalog browsing
    pub fn listing(&self) -> RoomListing {
        RoomListing {
            id: self.id,
            title: self.title.clone(),
            game: self.game.clone(),
            entry_fee: self.entry_fee,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Public projection of a room, without access credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomListing {
    pub id: RoomId,
    pub title: String,
    pub game: String,
    pub entry_fee: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
