//! Payment persistence
//!
//! Insert and select only. The `payments_append_only` trigger rejects any
//! UPDATE or DELETE with `restrict_violation`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use core_kernel::{BillId, PaymentId};
use domain_billing::Payment;

use super::{money_column, parse_column};
use crate::error::DatabaseError;

pub struct PaymentRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PaymentRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&mut self, payment: &Payment) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, bill_id, amount, currency, method, payment_date, reference, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::from(payment.id))
        .bind(Uuid::from(payment.bill_id))
        .bind(payment.amount.amount())
        .bind(payment.amount.currency().code())
        .bind(payment.method.as_str())
        .bind(payment.payment_date)
        .bind(&payment.reference)
        .bind(payment.created_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Payments of a bill in recording order
    pub async fn list_for_bill(&mut self, bill_id: BillId) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, bill_id, amount, currency, method, payment_date, reference, created_at
            FROM payments
            WHERE bill_id = $1
            ORDER BY created_at, payment_id
            "#,
        )
        .bind(Uuid::from(bill_id))
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub bill_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub method: String,
    pub payment_date: NaiveDate,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from(row.payment_id),
            bill_id: BillId::from(row.bill_id),
            amount: money_column("payments.currency", row.amount, &row.currency)?,
            method: parse_column("payments.method", &row.method)?,
            payment_date: row.payment_date,
            reference: row.reference,
            created_at: row.created_at,
        })
    }
}
