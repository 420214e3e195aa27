//! Store ports
//!
//! The coordinator needs one thing from persistence: a unit of work over the
//! six lodging entities that either commits as a whole or leaves no trace.
//!
//! - [`LodgingStore`] hands out transactions and reports health.
//! - [`StoreTransaction`] carries every read and write; it is committed
//!   explicitly and rolled back when dropped without a commit.
//!
//! # Adapters
//!
//! - **PostgreSQL** (`infra_db::PostgresLodgingStore`): row locks via
//!   `SELECT ... FOR UPDATE`, counters advanced with `UPDATE ... RETURNING`.
//! - **In-memory** ([`crate::adapters::InMemoryLodgingStore`]): transactions
//!   are serialized on a single lock and work on a copy of the state.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut tx = store.begin().await?;
//! let room = tx.lock_room(room_id).await?;
//! tx.set_room_status(room.id, RoomStatus::Maintenance, now).await?;
//! tx.commit().await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{
    BillId, CustomerId, DomainPort, HealthCheckable, PortError, ReservationId, RoomId, RoomTypeId,
    StayPeriod,
};
use domain_billing::{Bill, BillAmounts, BillCategory, BillStatus, InvoiceCounter, InvoiceNumber, LineItem, Payment};
use domain_reservation::{Reservation, ReservationStatus, Room, RoomStatus, RoomType};

/// Query parameters for listing reservations
///
/// Results are ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct ReservationQuery {
    pub customer_id: Option<CustomerId>,
    pub room_id: Option<RoomId>,
    pub status: Option<ReservationStatus>,
    pub limit: Option<u32>,
}

impl ReservationQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    pub fn by_room(room_id: RoomId) -> Self {
        Self {
            room_id: Some(room_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if `reservation` passes every filter
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.customer_id.map_or(true, |id| reservation.customer_id == id)
            && self.room_id.map_or(true, |id| reservation.room_id == id)
            && self.status.map_or(true, |status| reservation.status == status)
    }
}

/// Query parameters for listing bills
///
/// Results are ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct BillQuery {
    pub customer_id: Option<CustomerId>,
    pub reservation_id: Option<ReservationId>,
    pub category: Option<BillCategory>,
    pub status: Option<BillStatus>,
    pub limit: Option<u32>,
}

impl BillQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: BillStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_category(mut self, category: BillCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if `bill` passes every filter
    pub fn matches(&self, bill: &Bill) -> bool {
        self.customer_id.map_or(true, |id| bill.customer_id == id)
            && self.reservation_id.map_or(true, |id| bill.reservation_id == Some(id))
            && self.category.map_or(true, |category| bill.category == category)
            && self.status.map_or(true, |status| bill.status == status)
    }
}

/// Transactional entry point to lodging persistence
#[async_trait]
pub trait LodgingStore: DomainPort + HealthCheckable {
    /// Opens a unit of work
    ///
    /// # Errors
    ///
    /// Returns `PortError::Connection` if the backend is unreachable
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, PortError>;
}

/// A unit of work over rooms, reservations, invoice counters, bills, and payments
///
/// Reads see the transaction's own writes. `lock_*` methods additionally hold
/// the row until the transaction ends, so two transactions locking the same
/// room or bill run one after the other.
///
/// Dropping a transaction without calling [`StoreTransaction::commit`] rolls
/// every write back, including invoice counter increments.
#[async_trait]
pub trait StoreTransaction: Send {
    // ========================================================================
    // Room Types
    // ========================================================================

    /// Inserts a room type; `PortError::Conflict` if the name is taken
    async fn insert_room_type(&mut self, room_type: &RoomType) -> Result<(), PortError>;

    async fn get_room_type(&mut self, id: RoomTypeId) -> Result<RoomType, PortError>;

    async fn list_room_types(&mut self) -> Result<Vec<RoomType>, PortError>;

    // ========================================================================
    // Rooms
    // ========================================================================

    /// Inserts a room; `PortError::Conflict` if the room number is taken
    async fn insert_room(&mut self, room: &Room) -> Result<(), PortError>;

    async fn get_room(&mut self, id: RoomId) -> Result<Room, PortError>;

    /// Reads a room and holds its row lock until the transaction ends
    async fn lock_room(&mut self, id: RoomId) -> Result<Room, PortError>;

    /// Lists rooms ordered by room number
    async fn list_rooms(&mut self) -> Result<Vec<Room>, PortError>;

    /// Unconditionally writes a room's status
    async fn set_room_status(
        &mut self,
        id: RoomId,
        status: RoomStatus,
        at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    // ========================================================================
    // Reservations
    // ========================================================================

    /// ACTIVE reservations on `room_id` overlapping `stay` (half-open)
    async fn find_overlapping(
        &mut self,
        room_id: RoomId,
        stay: &StayPeriod,
    ) -> Result<Vec<Reservation>, PortError>;

    /// Inserts a reservation
    ///
    /// Backends that enforce non-overlap themselves report a clash as
    /// `PortError::Conflict`.
    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), PortError>;

    async fn get_reservation(&mut self, id: ReservationId) -> Result<Reservation, PortError>;

    /// Reads a reservation and holds its row lock until the transaction ends
    async fn lock_reservation(&mut self, id: ReservationId) -> Result<Reservation, PortError>;

    async fn update_reservation_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    async fn set_actual_check_in(
        &mut self,
        id: ReservationId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    async fn set_actual_check_out(
        &mut self,
        id: ReservationId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    async fn list_reservations(&mut self, query: ReservationQuery) -> Result<Vec<Reservation>, PortError>;

    // ========================================================================
    // Invoice Counters
    // ========================================================================

    /// Inserts the counter unless one already exists for its category
    async fn ensure_invoice_counter(&mut self, counter: &InvoiceCounter) -> Result<(), PortError>;

    /// Atomically returns the category's next number and advances the counter
    async fn next_invoice_number(&mut self, category: BillCategory) -> Result<InvoiceNumber, PortError>;

    /// Reads a counter and holds its row lock until the transaction ends
    async fn lock_invoice_counter(&mut self, category: BillCategory) -> Result<InvoiceCounter, PortError>;

    async fn list_invoice_counters(&mut self) -> Result<Vec<InvoiceCounter>, PortError>;

    async fn set_invoice_next_number(
        &mut self,
        category: BillCategory,
        next_number: i64,
        at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    // ========================================================================
    // Bills
    // ========================================================================

    /// Inserts a bill together with its line items
    ///
    /// `PortError::Conflict` on a duplicate invoice number or a second bill
    /// for the same reservation.
    async fn insert_bill(&mut self, bill: &Bill) -> Result<(), PortError>;

    async fn get_bill(&mut self, id: BillId) -> Result<Bill, PortError>;

    /// Reads a bill and holds its row lock until the transaction ends
    async fn lock_bill(&mut self, id: BillId) -> Result<Bill, PortError>;

    async fn find_bill_for_reservation(&mut self, id: ReservationId) -> Result<Option<Bill>, PortError>;

    async fn update_bill_status(
        &mut self,
        id: BillId,
        status: BillStatus,
        at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    async fn update_bill_amounts(
        &mut self,
        id: BillId,
        amounts: &BillAmounts,
        at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    async fn insert_line_item(&mut self, item: &LineItem) -> Result<(), PortError>;

    async fn list_bills(&mut self, query: BillQuery) -> Result<Vec<Bill>, PortError>;

    // ========================================================================
    // Payments
    // ========================================================================

    /// Appends a payment; payments are never updated or deleted
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError>;

    /// Payments of a bill in the order they were recorded
    async fn list_payments(&mut self, bill_id: BillId) -> Result<Vec<Payment>, PortError>;

    // ========================================================================
    // Completion
    // ========================================================================

    /// Makes every write of this transaction durable
    async fn commit(self: Box<Self>) -> Result<(), PortError>;
}
