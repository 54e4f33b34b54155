//! Game room catalog.
//!
//! Rooms are created by administrators through the admin gateway and are
//! immutable afterwards. The public read surface only ever exposes the
//! credential-free [`RoomListing`] projection; room code and password are
//! reachable exclusively through the enrollment service, for members.

pub mod catalog;
pub mod errors;
pub mod models;

pub use catalog::RoomCatalog;
pub use errors::{RoomError, RoomResult};
pub use models::{NewRoom, Room, RoomCredentials, RoomId, RoomListing};
