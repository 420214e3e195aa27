//! Bill and line item persistence

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use core_kernel::{BillId, CustomerId, LineItemId, Rate, ReservationId};
use domain_billing::{Bill, BillAmounts, BillStatus, LineItem};
use domain_lifecycle::BillQuery;

use super::{money_column, parse_column};
use crate::error::DatabaseError;

/// Bill access within a transaction
///
/// A bill is stored as one `bills` row plus its `line_items`; every read
/// returns the bill with its items in position order.
pub struct BillRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> BillRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Inserts the bill header and all of its line items
    pub async fn insert(&mut self, bill: &Bill) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO bills (
                bill_id, customer_id, reservation_id, bill_type, category, invoice_number,
                bill_date, subtotal, tax, discount, total, currency, tax_rate, status,
                notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(Uuid::from(bill.id))
        .bind(Uuid::from(bill.customer_id))
        .bind(bill.reservation_id.map(Uuid::from))
        .bind(bill.bill_type.as_str())
        .bind(bill.category.as_str())
        .bind(&bill.invoice_number)
        .bind(bill.bill_date)
        .bind(bill.amounts.subtotal.amount())
        .bind(bill.amounts.tax.amount())
        .bind(bill.amounts.discount.amount())
        .bind(bill.amounts.total.amount())
        .bind(bill.currency().code())
        .bind(bill.tax_rate.map(|rate| rate.as_decimal()))
        .bind(bill.status.as_str())
        .bind(&bill.notes)
        .bind(bill.created_at)
        .bind(bill.updated_at)
        .execute(&mut *self.conn)
        .await?;

        for item in &bill.line_items {
            self.insert_line_item(item).await?;
        }
        Ok(())
    }

    pub async fn insert_line_item(&mut self, item: &LineItem) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO line_items (line_item_id, bill_id, position, description, amount, currency)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::from(item.id))
        .bind(Uuid::from(item.bill_id))
        .bind(item.position)
        .bind(&item.description)
        .bind(item.amount.amount())
        .bind(item.amount.currency().code())
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn get(&mut self, id: BillId) -> Result<Bill, DatabaseError> {
        let row = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT bill_id, customer_id, reservation_id, bill_type, category, invoice_number,
                   bill_date, subtotal, tax, discount, total, currency, tax_rate, status,
                   notes, created_at, updated_at
            FROM bills
            WHERE bill_id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", id))?;

        self.with_items(row).await
    }

    pub async fn lock(&mut self, id: BillId) -> Result<Bill, DatabaseError> {
        let row = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT bill_id, customer_id, reservation_id, bill_type, category, invoice_number,
                   bill_date, subtotal, tax, discount, total, currency, tax_rate, status,
                   notes, created_at, updated_at
            FROM bills
            WHERE bill_id = $1
            FOR UPDATE
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", id))?;

        self.with_items(row).await
    }

    pub async fn find_for_reservation(&mut self, id: ReservationId) -> Result<Option<Bill>, DatabaseError> {
        let row = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT bill_id, customer_id, reservation_id, bill_type, category, invoice_number,
                   bill_date, subtotal, tax, discount, total, currency, tax_rate, status,
                   notes, created_at, updated_at
            FROM bills
            WHERE reservation_id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *self.conn)
        .await?;

        match row {
            Some(row) => Ok(Some(self.with_items(row).await?)),
            None => Ok(None),
        }
    }

    pub async fn update_status(
        &mut self,
        id: BillId,
        status: BillStatus,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE bills SET status = $2, updated_at = $3 WHERE bill_id = $1")
            .bind(Uuid::from(id))
            .bind(status.as_str())
            .bind(at)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Bill", id));
        }
        Ok(())
    }

    pub async fn update_amounts(
        &mut self,
        id: BillId,
        amounts: &BillAmounts,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE bills
            SET subtotal = $2, tax = $3, discount = $4, total = $5, updated_at = $6
            WHERE bill_id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .bind(amounts.subtotal.amount())
        .bind(amounts.tax.amount())
        .bind(amounts.discount.amount())
        .bind(amounts.total.amount())
        .bind(at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Bill", id));
        }
        Ok(())
    }

    /// Filtered listing, newest first
    pub async fn list(&mut self, query: &BillQuery) -> Result<Vec<Bill>, DatabaseError> {
        let rows = sqlx::query_as::<_, BillRow>(
            r#"
            SELECT bill_id, customer_id, reservation_id, bill_type, category, invoice_number,
                   bill_date, subtotal, tax, discount, total, currency, tax_rate, status,
                   notes, created_at, updated_at
            FROM bills
            WHERE ($1::uuid IS NULL OR customer_id = $1)
              AND ($2::uuid IS NULL OR reservation_id = $2)
              AND ($3::varchar IS NULL OR category = $3)
              AND ($4::varchar IS NULL OR status = $4)
            ORDER BY created_at DESC, bill_id DESC
            LIMIT $5
            "#,
        )
        .bind(query.customer_id.map(Uuid::from))
        .bind(query.reservation_id.map(Uuid::from))
        .bind(query.category.map(|c| c.as_str()))
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.limit.map(i64::from))
        .fetch_all(&mut *self.conn)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.bill_id).collect();
        let mut items = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let bill_items = items.remove(&row.bill_id).unwrap_or_default();
                row.into_bill(bill_items)
            })
            .collect()
    }

    async fn with_items(&mut self, row: BillRow) -> Result<Bill, DatabaseError> {
        let mut items = self.items_for(&[row.bill_id]).await?;
        let bill_items = items.remove(&row.bill_id).unwrap_or_default();
        row.into_bill(bill_items)
    }

    async fn items_for(&mut self, bill_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<LineItem>>, DatabaseError> {
        if bill_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT line_item_id, bill_id, position, description, amount, currency
            FROM line_items
            WHERE bill_id = ANY($1)
            ORDER BY bill_id, position
            "#,
        )
        .bind(bill_ids)
        .fetch_all(&mut *self.conn)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for row in rows {
            let bill_id = row.bill_id;
            grouped.entry(bill_id).or_default().push(LineItem::try_from(row)?);
        }
        Ok(grouped)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct BillRow {
    pub bill_id: Uuid,
    pub customer_id: Uuid,
    pub reservation_id: Option<Uuid>,
    pub bill_type: String,
    pub category: String,
    pub invoice_number: String,
    pub bill_date: NaiveDate,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub tax_rate: Option<Decimal>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BillRow {
    /// Assembles the domain bill, re-checking the stored total
    pub fn into_bill(self, line_items: Vec<LineItem>) -> Result<Bill, DatabaseError> {
        let amounts = BillAmounts::new(
            money_column("bills.currency", self.subtotal, &self.currency)?,
            money_column("bills.currency", self.tax, &self.currency)?,
            money_column("bills.currency", self.discount, &self.currency)?,
        )
        .map_err(|e| DatabaseError::decode("bills.subtotal", e))?;

        if amounts.total.amount() != self.total {
            return Err(DatabaseError::decode(
                "bills.total",
                format!("stored {} but components give {}", self.total, amounts.total),
            ));
        }

        Ok(Bill {
            id: BillId::from(self.bill_id),
            customer_id: CustomerId::from(self.customer_id),
            reservation_id: self.reservation_id.map(ReservationId::from),
            bill_type: parse_column("bills.bill_type", &self.bill_type)?,
            category: parse_column("bills.category", &self.category)?,
            invoice_number: self.invoice_number,
            bill_date: self.bill_date,
            amounts,
            tax_rate: self.tax_rate.map(Rate::new),
            status: parse_column("bills.status", &self.status)?,
            line_items,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LineItemRow {
    pub line_item_id: Uuid,
    pub bill_id: Uuid,
    pub position: i32,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = DatabaseError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        Ok(LineItem {
            id: LineItemId::from(row.line_item_id),
            bill_id: BillId::from(row.bill_id),
            position: row.position,
            description: row.description,
            amount: money_column("line_items.currency", row.amount, &row.currency)?,
        })
    }
}
