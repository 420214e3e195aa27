//! Reservation persistence

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use core_kernel::{CustomerId, ReservationId, RoomId, StayPeriod};
use domain_lifecycle::ReservationQuery;
use domain_reservation::{Reservation, ReservationStatus};

use super::parse_column;
use crate::error::DatabaseError;

/// Reservation access within a transaction
///
/// Inserting an ACTIVE stay that overlaps another on the same room fails
/// with `DatabaseError::Overlap` from the `reservations_no_overlap`
/// exclusion constraint, even when the caller skipped the overlap query.
pub struct ReservationRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ReservationRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&mut self, reservation: &Reservation) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO reservations (
                reservation_id, customer_id, room_id, check_in_date, check_out_date,
                actual_check_in, actual_check_out, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::from(reservation.id))
        .bind(Uuid::from(reservation.customer_id))
        .bind(Uuid::from(reservation.room_id))
        .bind(reservation.stay.check_in())
        .bind(reservation.stay.check_out())
        .bind(reservation.actual_check_in)
        .bind(reservation.actual_check_out)
        .bind(reservation.status.as_str())
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// ACTIVE reservations on the room whose half-open stay intersects `stay`
    pub async fn find_overlapping(
        &mut self,
        room_id: RoomId,
        stay: &StayPeriod,
    ) -> Result<Vec<Reservation>, DatabaseError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT reservation_id, customer_id, room_id, check_in_date, check_out_date,
                   actual_check_in, actual_check_out, status, created_at, updated_at
            FROM reservations
            WHERE room_id = $1
              AND status = 'ACTIVE'
              AND check_in_date < $3
              AND $2 < check_out_date
            ORDER BY check_in_date
            "#,
        )
        .bind(Uuid::from(room_id))
        .bind(stay.check_in())
        .bind(stay.check_out())
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    pub async fn get(&mut self, id: ReservationId) -> Result<Reservation, DatabaseError> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT reservation_id, customer_id, room_id, check_in_date, check_out_date,
                   actual_check_in, actual_check_out, status, created_at, updated_at
            FROM reservations
            WHERE reservation_id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Reservation", id))?;

        row.try_into()
    }

    pub async fn lock(&mut self, id: ReservationId) -> Result<Reservation, DatabaseError> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT reservation_id, customer_id, room_id, check_in_date, check_out_date,
                   actual_check_in, actual_check_out, status, created_at, updated_at
            FROM reservations
            WHERE reservation_id = $1
            FOR UPDATE
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Reservation", id))?;

        row.try_into()
    }

    pub async fn update_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE reservations SET status = $2, updated_at = $3 WHERE reservation_id = $1",
        )
        .bind(Uuid::from(id))
        .bind(status.as_str())
        .bind(at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Reservation", id));
        }
        Ok(())
    }

    pub async fn set_actual_check_in(
        &mut self,
        id: ReservationId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE reservations SET actual_check_in = $2, updated_at = $3 WHERE reservation_id = $1",
        )
        .bind(Uuid::from(id))
        .bind(date)
        .bind(at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Reservation", id));
        }
        Ok(())
    }

    pub async fn set_actual_check_out(
        &mut self,
        id: ReservationId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE reservations SET actual_check_out = $2, updated_at = $3 WHERE reservation_id = $1",
        )
        .bind(Uuid::from(id))
        .bind(date)
        .bind(at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Reservation", id));
        }
        Ok(())
    }

    /// Filtered listing, newest first
    pub async fn list(&mut self, query: &ReservationQuery) -> Result<Vec<Reservation>, DatabaseError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT reservation_id, customer_id, room_id, check_in_date, check_out_date,
                   actual_check_in, actual_check_out, status, created_at, updated_at
            FROM reservations
            WHERE ($1::uuid IS NULL OR customer_id = $1)
              AND ($2::uuid IS NULL OR room_id = $2)
              AND ($3::varchar IS NULL OR status = $3)
            ORDER BY created_at DESC, reservation_id DESC
            LIMIT $4
            "#,
        )
        .bind(query.customer_id.map(Uuid::from))
        .bind(query.room_id.map(Uuid::from))
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.limit.map(i64::from))
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Reservation::try_from).collect()
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    pub reservation_id: Uuid,
    pub customer_id: Uuid,
    pub room_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub actual_check_in: Option<NaiveDate>,
    pub actual_check_out: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DatabaseError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let stay = StayPeriod::new(row.check_in_date, row.check_out_date)
            .map_err(|e| DatabaseError::decode("reservations.check_out_date", e))?;

        Ok(Reservation {
            id: ReservationId::from(row.reservation_id),
            customer_id: CustomerId::from(row.customer_id),
            room_id: RoomId::from(row.room_id),
            stay,
            actual_check_in: row.actual_check_in,
            actual_check_out: row.actual_check_out,
            status: parse_column("reservations.status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
