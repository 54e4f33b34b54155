//! Enrollment service implementation.

use std::sync::Arc;

use crate::db::repository::{EnrollmentStore, LedgerStore, RoomStore};
use crate::identity::Identity;
use crate::ledger::EntryKind;
use crate::rooms::{RoomCredentials, RoomId};

use super::errors::{EnrollmentError, EnrollmentResult};
use super::models::Enrollment;

/// Enrollment manager
#[derive(Clone)]
pub struct EnrollmentManager {
    ledger: Arc<dyn LedgerStore>,
    rooms: Arc<dyn RoomStore>,
    enrollments: Arc<dyn EnrollmentStore>,
}

impl EnrollmentManager {
    /// Create a new enrollment manager over store backends
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        rooms: Arc<dyn RoomStore>,
        enrollments: Arc<dyn EnrollmentStore>,
    ) -> Self {
        Self {
            ledger,
            rooms,
            enrollments,
        }
    }

    /// Spend the entry fee and join a room.
    ///
    /// The fee debit and the membership insert form one logical unit: if
    /// the insert fails after a successful debit, the fee is credited
    /// back before the error is returned.
    ///
    /// # Errors
    ///
    /// * `EnrollmentError::RoomNotFound` - No room with this id
    /// * `EnrollmentError::RoomInactive` - Room is not accepting enrollments
    /// * `EnrollmentError::Ledger` - Insufficient funds, the debit is not applied
    /// * `EnrollmentError::DuplicateEnrollment` - Already a member; the fee
    ///   debit has been refunded
    pub async fn enroll(
        &self,
        identity: &Identity,
        room_id: RoomId,
        player_handle: &str,
    ) -> EnrollmentResult<Enrollment> {
        if player_handle.trim().is_empty() {
            return Err(EnrollmentError::InvalidPlayerHandle);
        }

        let room = self.rooms.get(room_id).await?;
        if !room.is_active {
            return Err(EnrollmentError::RoomInactive(room_id));
        }

        let account_id = identity.account_id;
        self.ledger
            .adjust(account_id, -room.entry_fee, EntryKind::EntryFee, Some(room_id))
            .await?;

        let enrollment = Enrollment::new(account_id, room_id, player_handle);
        match self.enrollments.insert(&enrollment).await {
            Ok(()) => {
                log::info!(
                    "Account {} enrolled in room {} for {} coins",
                    account_id,
                    room_id,
                    room.entry_fee
                );
                Ok(enrollment)
            }
            Err(err) => {
                log::warn!(
                    "Enrollment insert failed for account {} in room {}, refunding {} coins: {}",
                    account_id,
                    room_id,
                    room.entry_fee,
                    err
                );
                if let Err(refund_err) = self
                    .ledger
                    .adjust(account_id, room.entry_fee, EntryKind::Refund, Some(room_id))
                    .await
                {
                    // The debit stays visible in the entry log for manual
                    // reconciliation.
                    log::error!(
                        "Failed to refund entry fee for account {} in room {}: {}",
                        account_id,
                        room_id,
                        refund_err
                    );
                }
                Err(err)
            }
        }
    }

    /// Room access credentials, disclosed only to enrolled members
    ///
    /// # Errors
    ///
    /// * `EnrollmentError::RoomNotFound` - No room with this id
    /// * `EnrollmentError::NotEnrolled` - Caller has no membership for the room
    pub async fn room_credentials(
        &self,
        identity: &Identity,
        room_id: RoomId,
    ) -> EnrollmentResult<RoomCredentials> {
        let room = self.rooms.get(room_id).await?;
        match self
            .enrollments
            .find(identity.account_id, room_id)
            .await?
        {
            Some(_) => Ok(room.credentials),
            None => Err(EnrollmentError::NotEnrolled {
                account_id: identity.account_id,
                room_id,
            }),
        }
    }

    /// Player handles enrolled in a room, oldest first
    pub async fn roster(&self, room_id: RoomId) -> EnrollmentResult<Vec<Enrollment>> {
        self.rooms.get(room_id).await?;
        self.enrollments.list_for_room(room_id).await
    }

    /// The calling account's memberships
    pub async fn enrollments(&self, identity: &Identity) -> EnrollmentResult<Vec<Enrollment>> {
        self.enrollments.list_for_account(identity.account_id).await
    }
}
