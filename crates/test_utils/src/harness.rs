//! Coordinator test harness
//!
//! Wires a [`LifecycleCoordinator`] to a store and a [`FixedClock`], seeds
//! both invoice counters, and registers one deluxe room.

use std::sync::Arc;

use core_kernel::{CustomerId, FixedClock, Rate, UuidV7Generator};
use domain_billing::BillCategory;
use domain_lifecycle::{
    BillingSettings, InMemoryLodgingStore, LifecycleCoordinator, LifecycleError, LodgingStore,
    NewReservation,
};
use domain_reservation::{Reservation, Room, RoomStatus, RoomType};

use crate::builders::{deluxe_room_type, room};
use crate::fixtures::{RateFixtures, StringFixtures, TemporalFixtures, FIXTURE_CURRENCY};

/// Room number of the harness room
pub const HARNESS_ROOM_NUMBER: &str = "101";

pub struct LodgingHarness {
    pub coordinator: Arc<LifecycleCoordinator>,
    pub clock: Arc<FixedClock>,
    pub room_type: RoomType,
    pub room: Room,
}

impl LodgingHarness {
    /// Harness over a fresh in-memory store at the standard GST rate
    pub async fn in_memory() -> Result<Self, LifecycleError> {
        Self::with_store(Arc::new(InMemoryLodgingStore::new()), RateFixtures::gst_standard()).await
    }

    /// Harness over any store
    ///
    /// The store must not already hold a room type named like the deluxe fixture.
    pub async fn with_store(store: Arc<dyn LodgingStore>, gst_rate: Rate) -> Result<Self, LifecycleError> {
        let clock = Arc::new(FixedClock::new(TemporalFixtures::today()));
        let coordinator = Arc::new(LifecycleCoordinator::new(
            store,
            clock.clone(),
            Arc::new(UuidV7Generator),
            BillingSettings::new(FIXTURE_CURRENCY, gst_rate),
        ));

        coordinator
            .ensure_invoice_counter(BillCategory::Gst, StringFixtures::gst_prefix())
            .await?;
        coordinator
            .ensure_invoice_counter(BillCategory::NonGst, StringFixtures::non_gst_prefix())
            .await?;

        let room_type = coordinator.register_room_type(deluxe_room_type()).await?;
        let room = coordinator
            .register_room(room(HARNESS_ROOM_NUMBER, room_type.id))
            .await?;

        Ok(Self {
            coordinator,
            clock,
            room_type,
            room,
        })
    }

    /// Books the harness room for a new customer from ISO date strings
    pub async fn book(&self, check_in: &str, check_out: &str) -> Result<Reservation, LifecycleError> {
        let request = NewReservation::parse(CustomerId::new_v7(), self.room.id, check_in, check_out)?;
        self.coordinator.create_reservation(request).await
    }

    /// Current status of the harness room
    pub async fn room_status(&self) -> Result<RoomStatus, LifecycleError> {
        Ok(self.coordinator.room(self.room.id).await?.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_harness_is_seeded() {
        let harness = LodgingHarness::in_memory().await.unwrap();

        assert_eq!(harness.room.room_number, HARNESS_ROOM_NUMBER);
        assert_eq!(harness.room.status, RoomStatus::Available);
        assert_eq!(harness.room.nightly_rate, harness.room_type.default_rate);

        let counters = harness.coordinator.invoice_counters().await.unwrap();
        assert_eq!(counters.len(), 2);
        assert!(counters.iter().all(|c| c.next_number == 1));
    }

    #[tokio::test]
    async fn test_book_reserves_the_harness_room() {
        let harness = LodgingHarness::in_memory().await.unwrap();

        let reservation = harness.book("2024-04-08", "2024-04-11").await.unwrap();

        assert_eq!(reservation.room_id, harness.room.id);
        assert_eq!(reservation.stay, TemporalFixtures::three_night_stay());
        assert!(harness.book("2024-04-10", "2024-04-12").await.is_err());
        assert_eq!(harness.room_status().await.unwrap(), RoomStatus::Available);
    }
}
