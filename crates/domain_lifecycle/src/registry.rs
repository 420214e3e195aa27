//! Room registry
//!
//! Room identity, type, rate, and current status. Status writes here are
//! unconditional; lifecycle rules live in the coordinator.

use chrono::{DateTime, Utc};

use core_kernel::{RoomId, RoomTypeId};
use domain_reservation::{Room, RoomStatus, RoomType};

use crate::error::LifecycleError;
use crate::ports::StoreTransaction;

/// Room operations within one store transaction
pub struct RoomRegistry<'a> {
    tx: &'a mut dyn StoreTransaction,
}

impl<'a> RoomRegistry<'a> {
    pub fn new(tx: &'a mut dyn StoreTransaction) -> Self {
        Self { tx }
    }

    pub async fn register_room_type(&mut self, room_type: &RoomType) -> Result<(), LifecycleError> {
        Ok(self.tx.insert_room_type(room_type).await?)
    }

    pub async fn room_type(&mut self, id: RoomTypeId) -> Result<RoomType, LifecycleError> {
        Ok(self.tx.get_room_type(id).await?)
    }

    pub async fn room_types(&mut self) -> Result<Vec<RoomType>, LifecycleError> {
        Ok(self.tx.list_room_types().await?)
    }

    pub async fn register_room(&mut self, room: &Room) -> Result<(), LifecycleError> {
        Ok(self.tx.insert_room(room).await?)
    }

    /// Reads a room; `NotFound` if it does not exist
    pub async fn get_room(&mut self, id: RoomId) -> Result<Room, LifecycleError> {
        Ok(self.tx.get_room(id).await?)
    }

    /// Reads a room and keeps it locked for the rest of the transaction
    pub async fn lock_room(&mut self, id: RoomId) -> Result<Room, LifecycleError> {
        Ok(self.tx.lock_room(id).await?)
    }

    pub async fn rooms(&mut self) -> Result<Vec<Room>, LifecycleError> {
        Ok(self.tx.list_rooms().await?)
    }

    /// Writes the status without any business validation
    pub async fn set_status(
        &mut self,
        id: RoomId,
        status: RoomStatus,
        at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        Ok(self.tx.set_room_status(id, status, at).await?)
    }
}
