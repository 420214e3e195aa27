//! In-memory lodging store
//!
//! Holds the whole property in one [`LodgingState`] behind an async mutex.
//! A transaction takes the lock for its entire lifetime and works on a copy
//! of the state; commit writes the copy back, dropping discards it. This gives
//! fully serialized transactions, which is stricter than the PostgreSQL
//! adapter's row locks but observably equivalent for the coordinator.
//!
//! The store enforces the same uniqueness and non-overlap rules as the
//! database schema so both adapters report the same conflicts.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use core_kernel::{
    AdapterHealth, BillId, DomainPort, HealthCheckResult, HealthCheckable, PortError, ReservationId,
    RoomId, RoomTypeId, StayPeriod,
};
use domain_billing::{
    Bill, BillAmounts, BillCategory, BillStatus, InvoiceCounter, InvoiceNumber, LineItem, Payment,
};
use domain_reservation::{find_overlapping, Reservation, ReservationStatus, Room, RoomStatus, RoomType};

use crate::ports::{BillQuery, LodgingStore, ReservationQuery, StoreTransaction};

/// Everything the store knows
#[derive(Debug, Clone, Default)]
pub struct LodgingState {
    room_types: BTreeMap<RoomTypeId, RoomType>,
    rooms: BTreeMap<RoomId, Room>,
    reservations: BTreeMap<ReservationId, Reservation>,
    counters: HashMap<BillCategory, InvoiceCounter>,
    bills: BTreeMap<BillId, Bill>,
    payments: Vec<Payment>,
}

/// Failures a test can switch on to exercise error paths
#[derive(Debug, Default)]
struct Faults {
    room_status_writes: AtomicBool,
}

/// A [`LodgingStore`] kept entirely in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryLodgingStore {
    state: Arc<Mutex<LodgingState>>,
    faults: Arc<Faults>,
}

impl InMemoryLodgingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent room status write fail with a connection error
    pub fn fail_room_status_writes(&self, fail: bool) {
        self.faults.room_status_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of the committed state, for assertions
    pub async fn snapshot(&self) -> LodgingState {
        self.state.lock().await.clone()
    }
}

impl LodgingState {
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values()
    }

    pub fn bills(&self) -> impl Iterator<Item = &Bill> {
        self.bills.values()
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }
}

impl DomainPort for InMemoryLodgingStore {}

#[async_trait]
impl HealthCheckable for InMemoryLodgingStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "in_memory_lodging_store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LodgingStore for InMemoryLodgingStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, PortError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            working,
            faults: Arc::clone(&self.faults),
        }))
    }
}

/// A serialized unit of work over a private copy of the state
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<LodgingState>,
    working: LodgingState,
    faults: Arc<Faults>,
}

impl InMemoryTransaction {
    fn reservation_mut(&mut self, id: ReservationId) -> Result<&mut Reservation, PortError> {
        self.working
            .reservations
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Reservation", id))
    }

    fn bill_mut(&mut self, id: BillId) -> Result<&mut Bill, PortError> {
        self.working
            .bills
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Bill", id))
    }

    fn counter_mut(&mut self, category: BillCategory) -> Result<&mut InvoiceCounter, PortError> {
        self.working
            .counters
            .get_mut(&category)
            .ok_or_else(|| PortError::not_found("InvoiceCounter", category))
    }
}

fn apply_limit<T>(mut items: Vec<T>, limit: Option<u32>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit as usize);
    }
    items
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn insert_room_type(&mut self, room_type: &RoomType) -> Result<(), PortError> {
        if self.working.room_types.values().any(|t| t.name == room_type.name) {
            return Err(PortError::conflict(format!("room type '{}' already exists", room_type.name)));
        }
        self.working.room_types.insert(room_type.id, room_type.clone());
        Ok(())
    }

    async fn get_room_type(&mut self, id: RoomTypeId) -> Result<RoomType, PortError> {
        self.working
            .room_types
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("RoomType", id))
    }

    async fn list_room_types(&mut self) -> Result<Vec<RoomType>, PortError> {
        let mut types: Vec<RoomType> = self.working.room_types.values().cloned().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn insert_room(&mut self, room: &Room) -> Result<(), PortError> {
        if !self.working.room_types.contains_key(&room.room_type_id) {
            return Err(PortError::validation(format!("unknown room type {}", room.room_type_id)));
        }
        if self.working.rooms.values().any(|r| r.room_number == room.room_number) {
            return Err(PortError::conflict(format!("room number '{}' already exists", room.room_number)));
        }
        self.working.rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn get_room(&mut self, id: RoomId) -> Result<Room, PortError> {
        self.working
            .rooms
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Room", id))
    }

    async fn lock_room(&mut self, id: RoomId) -> Result<Room, PortError> {
        // The whole state is already held by this transaction
        self.get_room(id).await
    }

    async fn list_rooms(&mut self) -> Result<Vec<Room>, PortError> {
        let mut rooms: Vec<Room> = self.working.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    async fn set_room_status(
        &mut self,
        id: RoomId,
        status: RoomStatus,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        if self.faults.room_status_writes.load(Ordering::SeqCst) {
            return Err(PortError::connection("room status write failed"));
        }
        let room = self
            .working
            .rooms
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Room", id))?;
        room.status = status;
        room.updated_at = at;
        debug!(room_id = %id, status = %status, "Room status written");
        Ok(())
    }

    async fn find_overlapping(
        &mut self,
        room_id: RoomId,
        stay: &StayPeriod,
    ) -> Result<Vec<Reservation>, PortError> {
        Ok(find_overlapping(room_id, stay, self.working.reservations.values())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), PortError> {
        if !self.working.rooms.contains_key(&reservation.room_id) {
            return Err(PortError::validation(format!("unknown room {}", reservation.room_id)));
        }
        if reservation.is_active()
            && !find_overlapping(reservation.room_id, &reservation.stay, self.working.reservations.values())
                .is_empty()
        {
            return Err(PortError::conflict(format!(
                "room {} already has an active reservation overlapping {}",
                reservation.room_id, reservation.stay
            )));
        }
        self.working.reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn get_reservation(&mut self, id: ReservationId) -> Result<Reservation, PortError> {
        self.reservation_mut(id).map(|r| r.clone())
    }

    async fn lock_reservation(&mut self, id: ReservationId) -> Result<Reservation, PortError> {
        self.get_reservation(id).await
    }

    async fn update_reservation_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        let reservation = self.reservation_mut(id)?;
        reservation.status = status;
        reservation.updated_at = at;
        Ok(())
    }

    async fn set_actual_check_in(
        &mut self,
        id: ReservationId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        let reservation = self.reservation_mut(id)?;
        reservation.actual_check_in = Some(date);
        reservation.updated_at = at;
        Ok(())
    }

    async fn set_actual_check_out(
        &mut self,
        id: ReservationId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        let reservation = self.reservation_mut(id)?;
        reservation.actual_check_out = Some(date);
        reservation.updated_at = at;
        Ok(())
    }

    async fn list_reservations(&mut self, query: ReservationQuery) -> Result<Vec<Reservation>, PortError> {
        let mut found: Vec<Reservation> = self
            .working
            .reservations
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(apply_limit(found, query.limit))
    }

    async fn ensure_invoice_counter(&mut self, counter: &InvoiceCounter) -> Result<(), PortError> {
        self.working
            .counters
            .entry(counter.category)
            .or_insert_with(|| counter.clone());
        Ok(())
    }

    async fn next_invoice_number(&mut self, category: BillCategory) -> Result<InvoiceNumber, PortError> {
        let now = Utc::now();
        Ok(self.counter_mut(category)?.allocate(now))
    }

    async fn lock_invoice_counter(&mut self, category: BillCategory) -> Result<InvoiceCounter, PortError> {
        self.counter_mut(category).map(|c| c.clone())
    }

    async fn list_invoice_counters(&mut self) -> Result<Vec<InvoiceCounter>, PortError> {
        let mut counters: Vec<InvoiceCounter> = self.working.counters.values().cloned().collect();
        counters.sort_by_key(|c| c.category.as_str());
        Ok(counters)
    }

    async fn set_invoice_next_number(
        &mut self,
        category: BillCategory,
        next_number: i64,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        let counter = self.counter_mut(category)?;
        counter.next_number = next_number;
        counter.updated_at = at;
        Ok(())
    }

    async fn insert_bill(&mut self, bill: &Bill) -> Result<(), PortError> {
        if self.working.bills.values().any(|b| b.invoice_number == bill.invoice_number) {
            return Err(PortError::conflict(format!(
                "invoice number {} already issued",
                bill.invoice_number
            )));
        }
        if let Some(reservation_id) = bill.reservation_id {
            if !self.working.reservations.contains_key(&reservation_id) {
                return Err(PortError::validation(format!("unknown reservation {}", reservation_id)));
            }
            if self.working.bills.values().any(|b| b.reservation_id == Some(reservation_id)) {
                return Err(PortError::conflict(format!(
                    "reservation {} already has a bill",
                    reservation_id
                )));
            }
        }
        if !bill.amounts.is_consistent() {
            return Err(PortError::validation("bill total does not match subtotal + tax - discount"));
        }
        self.working.bills.insert(bill.id, bill.clone());
        Ok(())
    }

    async fn get_bill(&mut self, id: BillId) -> Result<Bill, PortError> {
        self.bill_mut(id).map(|b| b.clone())
    }

    async fn lock_bill(&mut self, id: BillId) -> Result<Bill, PortError> {
        self.get_bill(id).await
    }

    async fn find_bill_for_reservation(&mut self, id: ReservationId) -> Result<Option<Bill>, PortError> {
        Ok(self
            .working
            .bills
            .values()
            .find(|b| b.reservation_id == Some(id))
            .cloned())
    }

    async fn update_bill_status(
        &mut self,
        id: BillId,
        status: BillStatus,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        let bill = self.bill_mut(id)?;
        bill.status = status;
        bill.updated_at = at;
        Ok(())
    }

    async fn update_bill_amounts(
        &mut self,
        id: BillId,
        amounts: &BillAmounts,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        if !amounts.is_consistent() {
            return Err(PortError::validation("bill total does not match subtotal + tax - discount"));
        }
        let bill = self.bill_mut(id)?;
        bill.amounts = *amounts;
        bill.updated_at = at;
        Ok(())
    }

    async fn insert_line_item(&mut self, item: &LineItem) -> Result<(), PortError> {
        let bill = self.bill_mut(item.bill_id)?;
        if bill.line_items.iter().any(|i| i.id == item.id) {
            return Err(PortError::conflict(format!("line item {} already exists", item.id)));
        }
        bill.line_items.push(item.clone());
        bill.line_items.sort_by_key(|i| i.position);
        Ok(())
    }

    async fn list_bills(&mut self, query: BillQuery) -> Result<Vec<Bill>, PortError> {
        let mut found: Vec<Bill> = self
            .working
            .bills
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(apply_limit(found, query.limit))
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
        if !self.working.bills.contains_key(&payment.bill_id) {
            return Err(PortError::validation(format!("unknown bill {}", payment.bill_id)));
        }
        if self.working.payments.iter().any(|p| p.id == payment.id) {
            return Err(PortError::conflict(format!("payment {} already recorded", payment.id)));
        }
        self.working.payments.push(payment.clone());
        Ok(())
    }

    async fn list_payments(&mut self, bill_id: BillId) -> Result<Vec<Payment>, PortError> {
        Ok(self
            .working
            .payments
            .iter()
            .filter(|p| p.bill_id == bill_id)
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let InMemoryTransaction { mut guard, working, .. } = *self;
        *guard = working;
        Ok(())
    }
}
