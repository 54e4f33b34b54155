//! Room catalog read surface.

use std::sync::Arc;

use crate::db::repository::RoomStore;

use super::errors::RoomResult;
use super::models::{Room, RoomId, RoomListing};

/// Room catalog
///
/// Browsing surface over the room registry. Only credential-free
/// listings leave this type; room creation lives on the admin gateway.
#[derive(Clone)]
pub struct RoomCatalog {
    rooms: Arc<dyn RoomStore>,
}

impl RoomCatalog {
    /// Create a new catalog over a store backend
    pub fn new(rooms: Arc<dyn RoomStore>) -> Self {
        Self { rooms }
    }

    /// Look up one room
    ///
    /// # Errors
    ///
    /// * `RoomError::NotFound` - No room with this id
    pub async fn get_room(&self, room_id: RoomId) -> RoomResult<RoomListing> {
        Ok(self.rooms.get(room_id).await?.listing())
    }

    /// All active rooms, newest first
    pub async fn list_active(&self) -> RoomResult<Vec<RoomListing>> {
        let rooms = self.rooms.list_active().await?;
        Ok(rooms.iter().map(Room::listing).collect())
    }
}
