//! PostgreSQL Lodging Store Adapter
//!
//! Implements the lifecycle crate's `LodgingStore` port on a `PgPool`. Each
//! `begin` opens a database transaction; every repository call of that unit
//! of work runs on the transaction's connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::{create_pool, DatabaseConfig, PostgresLodgingStore};
//! use domain_lifecycle::LodgingStore;
//!
//! let pool = create_pool(DatabaseConfig::new(url)).await?;
//! let store: Arc<dyn LodgingStore> = Arc::new(PostgresLodgingStore::new(pool));
//! let mut tx = store.begin().await?;
//! let rooms = tx.list_rooms().await?;
//! tx.commit().await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, BillId, DomainPort, HealthCheckResult, HealthCheckable, PortError, ReservationId, RoomId,
    RoomTypeId, StayPeriod,
};
use domain_billing::{Bill, BillAmounts, BillCategory, BillStatus, InvoiceCounter, InvoiceNumber, LineItem, Payment};
use domain_lifecycle::{BillQuery, LodgingStore, ReservationQuery, StoreTransaction};
use domain_reservation::{Reservation, ReservationStatus, Room, RoomStatus, RoomType};

use crate::error::{db_to_port_error, DatabaseError};
use crate::repositories::{
    BillRepository, InvoiceCounterRepository, PaymentRepository, ReservationRepository, RoomRepository,
};

const ADAPTER_ID: &str = "postgres-lodging-store";

/// PostgreSQL-backed lodging store
#[derive(Debug, Clone)]
pub struct PostgresLodgingStore {
    pool: PgPool,
}

impl PostgresLodgingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresLodgingStore {}

#[async_trait]
impl HealthCheckable for PostgresLodgingStore {
    /// Runs `SELECT 1` on a pooled connection
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl LodgingStore for PostgresLodgingStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, PortError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_to_port_error(DatabaseError::from(e)))?;
        debug!("Store transaction opened");
        Ok(Box::new(PgLodgingTransaction { tx }))
    }
}

/// One open database transaction
///
/// Dropping it without `commit` rolls the transaction back.
pub struct PgLodgingTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgLodgingTransaction {
    fn rooms(&mut self) -> RoomRepository<'_> {
        RoomRepository::new(&mut *self.tx)
    }

    fn reservations(&mut self) -> ReservationRepository<'_> {
        ReservationRepository::new(&mut *self.tx)
    }

    fn counters(&mut self) -> InvoiceCounterRepository<'_> {
        InvoiceCounterRepository::new(&mut *self.tx)
    }

    fn bills(&mut self) -> BillRepository<'_> {
        BillRepository::new(&mut *self.tx)
    }

    fn payments(&mut self) -> PaymentRepository<'_> {
        PaymentRepository::new(&mut *self.tx)
    }
}

#[async_trait]
impl StoreTransaction for PgLodgingTransaction {
    async fn insert_room_type(&mut self, room_type: &RoomType) -> Result<(), PortError> {
        self.rooms().insert_type(room_type).await.map_err(db_to_port_error)
    }

    async fn get_room_type(&mut self, id: RoomTypeId) -> Result<RoomType, PortError> {
        self.rooms().get_type(id).await.map_err(db_to_port_error)
    }

    async fn list_room_types(&mut self) -> Result<Vec<RoomType>, PortError> {
        self.rooms().list_types().await.map_err(db_to_port_error)
    }

    async fn insert_room(&mut self, room: &Room) -> Result<(), PortError> {
        self.rooms().insert(room).await.map_err(db_to_port_error)
    }

    async fn get_room(&mut self, id: RoomId) -> Result<Room, PortError> {
        self.rooms().get(id).await.map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(room_id = %id))]
    async fn lock_room(&mut self, id: RoomId) -> Result<Room, PortError> {
        self.rooms().lock(id).await.map_err(db_to_port_error)
    }

    async fn list_rooms(&mut self) -> Result<Vec<Room>, PortError> {
        self.rooms().list().await.map_err(db_to_port_error)
    }

    #[instrument(skip(self, at), fields(room_id = %id, status = %status))]
    async fn set_room_status(&mut self, id: RoomId, status: RoomStatus, at: DateTime<Utc>) -> Result<(), PortError> {
        self.rooms().set_status(id, status, at).await.map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(room_id = %room_id, stay = %stay))]
    async fn find_overlapping(&mut self, room_id: RoomId, stay: &StayPeriod) -> Result<Vec<Reservation>, PortError> {
        self.reservations()
            .find_overlapping(room_id, stay)
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), PortError> {
        self.reservations().insert(reservation).await.map_err(db_to_port_error)
    }

    async fn get_reservation(&mut self, id: ReservationId) -> Result<Reservation, PortError> {
        self.reservations().get(id).await.map_err(db_to_port_error)
    }

    async fn lock_reservation(&mut self, id: ReservationId) -> Result<Reservation, PortError> {
        self.reservations().lock(id).await.map_err(db_to_port_error)
    }

    async fn update_reservation_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        self.reservations()
            .update_status(id, status, at)
            .await
            .map_err(db_to_port_error)
    }

    async fn set_actual_check_in(&mut self, id: ReservationId, date: NaiveDate, at: DateTime<Utc>) -> Result<(), PortError> {
        self.reservations()
            .set_actual_check_in(id, date, at)
            .await
            .map_err(db_to_port_error)
    }

    async fn set_actual_check_out(&mut self, id: ReservationId, date: NaiveDate, at: DateTime<Utc>) -> Result<(), PortError> {
        self.reservations()
            .set_actual_check_out(id, date, at)
            .await
            .map_err(db_to_port_error)
    }

    async fn list_reservations(&mut self, query: ReservationQuery) -> Result<Vec<Reservation>, PortError> {
        self.reservations().list(&query).await.map_err(db_to_port_error)
    }

    async fn ensure_invoice_counter(&mut self, counter: &InvoiceCounter) -> Result<(), PortError> {
        self.counters().ensure(counter).await.map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(category = %category))]
    async fn next_invoice_number(&mut self, category: BillCategory) -> Result<InvoiceNumber, PortError> {
        self.counters().allocate(category).await.map_err(db_to_port_error)
    }

    async fn lock_invoice_counter(&mut self, category: BillCategory) -> Result<InvoiceCounter, PortError> {
        self.counters().lock(category).await.map_err(db_to_port_error)
    }

    async fn list_invoice_counters(&mut self) -> Result<Vec<InvoiceCounter>, PortError> {
        self.counters().list().await.map_err(db_to_port_error)
    }

    async fn set_invoice_next_number(
        &mut self,
        category: BillCategory,
        next_number: i64,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        self.counters()
            .set_next_number(category, next_number, at)
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self, bill), fields(bill_id = %bill.id, items = bill.line_items.len()))]
    async fn insert_bill(&mut self, bill: &Bill) -> Result<(), PortError> {
        self.bills().insert(bill).await.map_err(db_to_port_error)
    }

    async fn get_bill(&mut self, id: BillId) -> Result<Bill, PortError> {
        self.bills().get(id).await.map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(bill_id = %id))]
    async fn lock_bill(&mut self, id: BillId) -> Result<Bill, PortError> {
        self.bills().lock(id).await.map_err(db_to_port_error)
    }

    async fn find_bill_for_reservation(&mut self, id: ReservationId) -> Result<Option<Bill>, PortError> {
        self.bills().find_for_reservation(id).await.map_err(db_to_port_error)
    }

    async fn update_bill_status(&mut self, id: BillId, status: BillStatus, at: DateTime<Utc>) -> Result<(), PortError> {
        self.bills().update_status(id, status, at).await.map_err(db_to_port_error)
    }

    async fn update_bill_amounts(
        &mut self,
        id: BillId,
        amounts: &BillAmounts,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        self.bills().update_amounts(id, amounts, at).await.map_err(db_to_port_error)
    }

    async fn insert_line_item(&mut self, item: &LineItem) -> Result<(), PortError> {
        self.bills().insert_line_item(item).await.map_err(db_to_port_error)
    }

    async fn list_bills(&mut self, query: BillQuery) -> Result<Vec<Bill>, PortError> {
        self.bills().list(&query).await.map_err(db_to_port_error)
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id, bill_id = %payment.bill_id))]
    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), PortError> {
        self.payments().insert(payment).await.map_err(db_to_port_error)
    }

    async fn list_payments(&mut self, bill_id: BillId) -> Result<Vec<Payment>, PortError> {
        self.payments().list_for_bill(bill_id).await.map_err(db_to_port_error)
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_to_port_error(DatabaseError::from(e)))?;
        debug!("Store transaction committed");
        Ok(())
    }
}
