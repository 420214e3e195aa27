//! Room type and room persistence

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use core_kernel::{RoomId, RoomTypeId};
use domain_reservation::{Room, RoomStatus, RoomType};

use super::{money_column, parse_column};
use crate::error::DatabaseError;

/// Room and room type access within a transaction
pub struct RoomRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> RoomRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Room types
    // ========================================================================

    pub async fn insert_type(&mut self, room_type: &RoomType) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO room_types (room_type_id, name, default_rate, currency, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::from(room_type.id))
        .bind(&room_type.name)
        .bind(room_type.default_rate.amount())
        .bind(room_type.default_rate.currency().code())
        .bind(room_type.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn get_type(&mut self, id: RoomTypeId) -> Result<RoomType, DatabaseError> {
        let row = sqlx::query_as::<_, RoomTypeRow>(
            r#"
            SELECT room_type_id, name, default_rate, currency, created_at
            FROM room_types
            WHERE room_type_id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("RoomType", id))?;

        row.try_into()
    }

    pub async fn list_types(&mut self) -> Result<Vec<RoomType>, DatabaseError> {
        let rows = sqlx::query_as::<_, RoomTypeRow>(
            r#"
            SELECT room_type_id, name, default_rate, currency, created_at
            FROM room_types
            ORDER BY name
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(RoomType::try_from).collect()
    }

    // ========================================================================
    // Rooms
    // ========================================================================

    pub async fn insert(&mut self, room: &Room) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO rooms (
                room_id, room_number, room_type_id, nightly_rate, currency,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::from(room.id))
        .bind(&room.room_number)
        .bind(Uuid::from(room.room_type_id))
        .bind(room.nightly_rate.amount())
        .bind(room.nightly_rate.currency().code())
        .bind(room.status.as_str())
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn get(&mut self, id: RoomId) -> Result<Room, DatabaseError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT room_id, room_number, room_type_id, nightly_rate, currency,
                   status, created_at, updated_at
            FROM rooms
            WHERE room_id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Room", id))?;

        row.try_into()
    }

    /// Reads a room with `FOR UPDATE`; the lock lasts until commit or rollback
    pub async fn lock(&mut self, id: RoomId) -> Result<Room, DatabaseError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT room_id, room_number, room_type_id, nightly_rate, currency,
                   status, created_at, updated_at
            FROM rooms
            WHERE room_id = $1
            FOR UPDATE
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Room", id))?;

        row.try_into()
    }

    pub async fn list(&mut self) -> Result<Vec<Room>, DatabaseError> {
        let rows = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT room_id, room_number, room_type_id, nightly_rate, currency,
                   status, created_at, updated_at
            FROM rooms
            ORDER BY room_number
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Room::try_from).collect()
    }

    pub async fn set_status(
        &mut self,
        id: RoomId,
        status: RoomStatus,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE rooms SET status = $2, updated_at = $3 WHERE room_id = $1")
            .bind(Uuid::from(id))
            .bind(status.as_str())
            .bind(at)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Room", id));
        }
        Ok(())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct RoomTypeRow {
    pub room_type_id: Uuid,
    pub name: String,
    pub default_rate: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RoomTypeRow> for RoomType {
    type Error = DatabaseError;

    fn try_from(row: RoomTypeRow) -> Result<Self, Self::Error> {
        Ok(RoomType {
            id: RoomTypeId::from(row.room_type_id),
            name: row.name,
            default_rate: money_column("room_types.currency", row.default_rate, &row.currency)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RoomRow {
    pub room_id: Uuid,
    pub room_number: String,
    pub room_type_id: Uuid,
    pub nightly_rate: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RoomRow> for Room {
    type Error = DatabaseError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            id: RoomId::from(row.room_id),
            room_number: row.room_number,
            room_type_id: RoomTypeId::from(row.room_type_id),
            nightly_rate: money_column("rooms.currency", row.nightly_rate, &row.currency)?,
            status: parse_column("rooms.status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn room_row(status: &str) -> RoomRow {
        RoomRow {
            room_id: Uuid::now_v7(),
            room_number: "305".to_string(),
            room_type_id: Uuid::now_v7(),
            nightly_rate: dec!(2500.00),
            currency: "INR".to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_room_row_converts() {
        let room = Room::try_from(room_row("MAINTENANCE")).unwrap();
        assert_eq!(room.status, RoomStatus::Maintenance);
        assert_eq!(room.nightly_rate.amount(), dec!(2500));
    }

    #[test]
    fn test_unknown_status_is_decode_error() {
        let err = Room::try_from(room_row("BOOKED")).unwrap_err();
        assert!(matches!(err, DatabaseError::Decode { column: "rooms.status", .. }));
    }
}
