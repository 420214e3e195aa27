//! Invoice counter persistence
//!
//! Numbers are handed out with a single `UPDATE ... RETURNING`, which takes
//! the counter's row lock for the rest of the transaction. Two transactions
//! billing in the same category therefore serialize on the counter, and a
//! rolled-back bill gives its number back.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};

use domain_billing::{BillCategory, InvoiceCounter, InvoiceNumber};

use super::parse_column;
use crate::error::DatabaseError;

pub struct InvoiceCounterRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> InvoiceCounterRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Inserts the counter unless its category already has one
    pub async fn ensure(&mut self, counter: &InvoiceCounter) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO invoice_counters (category, prefix, next_number, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (category) DO NOTHING
            "#,
        )
        .bind(counter.category.as_str())
        .bind(&counter.prefix)
        .bind(counter.next_number)
        .bind(counter.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Returns the current number and advances the counter by one
    pub async fn allocate(&mut self, category: BillCategory) -> Result<InvoiceNumber, DatabaseError> {
        let allocated: Option<(String, i64)> = sqlx::query_as(
            r#"
            UPDATE invoice_counters
            SET next_number = next_number + 1, updated_at = NOW()
            WHERE category = $1
            RETURNING prefix, next_number - 1
            "#,
        )
        .bind(category.as_str())
        .fetch_optional(&mut *self.conn)
        .await?;

        let (prefix, number) = allocated.ok_or_else(|| DatabaseError::not_found("InvoiceCounter", category))?;
        Ok(InvoiceNumber { prefix, number })
    }

    pub async fn lock(&mut self, category: BillCategory) -> Result<InvoiceCounter, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceCounterRow>(
            r#"
            SELECT category, prefix, next_number, updated_at
            FROM invoice_counters
            WHERE category = $1
            FOR UPDATE
            "#,
        )
        .bind(category.as_str())
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("InvoiceCounter", category))?;

        row.try_into()
    }

    pub async fn list(&mut self) -> Result<Vec<InvoiceCounter>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceCounterRow>(
            "SELECT category, prefix, next_number, updated_at FROM invoice_counters ORDER BY category",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(InvoiceCounter::try_from).collect()
    }

    pub async fn set_next_number(
        &mut self,
        category: BillCategory,
        next_number: i64,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE invoice_counters SET next_number = $2, updated_at = $3 WHERE category = $1",
        )
        .bind(category.as_str())
        .bind(next_number)
        .bind(at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("InvoiceCounter", category));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct InvoiceCounterRow {
    pub category: String,
    pub prefix: String,
    pub next_number: i64,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceCounterRow> for InvoiceCounter {
    type Error = DatabaseError;

    fn try_from(row: InvoiceCounterRow) -> Result<Self, Self::Error> {
        Ok(InvoiceCounter {
            category: parse_column("invoice_counters.category", &row.category)?,
            prefix: row.prefix,
            next_number: row.next_number,
            updated_at: row.updated_at,
        })
    }
}
