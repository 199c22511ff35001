//! Invoices and their items
//!
//! `total_amount` is written together with the items, inside the same
//! transaction, so it always equals the sum of item totals.

use rust_decimal::Decimal;
use shared::models::{Invoice, InvoiceItem, InvoiceItemInput, InvoiceQuery, InvoiceUpdate};
use shared::util::snowflake_id;
use sqlx::{PgPool, Postgres, Transaction};

use super::{Scope, scope_filter};

/// Line items with their range-checked totals
#[derive(Debug)]
pub struct PricedItems<'a> {
    pub items: &'a [InvoiceItemInput],
    /// One per item, in order
    pub totals: Vec<Decimal>,
    pub total: Decimal,
}

pub async fn list(
    pool: &PgPool,
    scope: Scope,
    query: &InvoiceQuery,
) -> Result<Vec<Invoice>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(&format!(
        "SELECT i.* FROM invoices i
         WHERE {}
           AND ($3::BOOLEAN IS NULL OR i.is_paid = $3)
           AND ($4::BIGINT IS NULL OR i.customer_id = $4)
         ORDER BY i.issue_date DESC, i.invoice_number DESC",
        scope_filter("i.user_id")
    ))
    .bind(company)
    .bind(user)
    .bind(query.paid)
    .bind(query.customer_id)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invoices WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn items(pool: &PgPool, invoice_id: i64) -> Result<Vec<InvoiceItem>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, invoice_id, description, quantity, unit, unit_price, total
         FROM invoice_items WHERE invoice_id = $1 ORDER BY position",
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await
}

/// Highest `YYYYNNNN` number of an issuer for a year; the sequence may run
/// past four digits
pub async fn last_number(
    pool: &PgPool,
    user_id: i64,
    year: i32,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT invoice_number FROM invoices
         WHERE user_id = $1 AND invoice_number ~ $2
         ORDER BY length(invoice_number) DESC, invoice_number DESC LIMIT 1",
    )
    .bind(user_id)
    .bind(format!("^{year}[0-9]{{4,}}$"))
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(n,)| n))
}

pub async fn number_taken(
    pool: &PgPool,
    user_id: i64,
    number: &str,
    except: Option<i64>,
) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM invoices
         WHERE user_id = $1 AND invoice_number = $2 AND ($3::BIGINT IS NULL OR id <> $3))",
    )
    .bind(user_id)
    .bind(number)
    .bind(except)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: i64,
    priced: &PricedItems<'_>,
) -> Result<(), sqlx::Error> {
    for (position, (item, total)) in priced.items.iter().zip(&priced.totals).enumerate() {
        sqlx::query(
            "INSERT INTO invoice_items (id, invoice_id, position, description, quantity, unit, unit_price, total)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(snowflake_id())
        .bind(invoice_id)
        .bind(position as i32)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit.as_deref().unwrap_or("ks"))
        .bind(item.unit_price)
        .bind(total)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Insert an invoice with its items; `total_amount` comes from `priced`
pub async fn create(
    pool: &PgPool,
    invoice: &Invoice,
    priced: &PricedItems<'_>,
) -> Result<Invoice, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let created: Invoice = sqlx::query_as(
        "INSERT INTO invoices (id, user_id, customer_id, invoice_number, issue_date, due_date,
             taxable_date, variable_symbol, currency, is_paid, notes, total_amount, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         RETURNING *",
    )
    .bind(invoice.id)
    .bind(invoice.user_id)
    .bind(invoice.customer_id)
    .bind(&invoice.invoice_number)
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.taxable_date)
    .bind(&invoice.variable_symbol)
    .bind(&invoice.currency)
    .bind(invoice.is_paid)
    .bind(&invoice.notes)
    .bind(priced.total)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .fetch_one(&mut *tx)
    .await?;
    insert_items(&mut tx, created.id, priced).await?;
    tx.commit().await?;
    Ok(created)
}

/// Update header fields; items (and the total) are replaced when provided
pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &InvoiceUpdate,
    priced: Option<&PricedItems<'_>>,
    now: i64,
) -> Result<Option<Invoice>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let updated: Option<Invoice> = sqlx::query_as(
        "UPDATE invoices SET
             customer_id = COALESCE($2, customer_id),
             invoice_number = COALESCE($3, invoice_number),
             issue_date = COALESCE($4, issue_date),
             due_date = COALESCE($5, due_date),
             taxable_date = CASE WHEN $6 THEN $7 ELSE taxable_date END,
             variable_symbol = CASE WHEN $8 THEN $9 ELSE variable_symbol END,
             currency = COALESCE($10, currency),
             notes = CASE WHEN $11 THEN $12 ELSE notes END,
             is_paid = COALESCE($13, is_paid),
             total_amount = COALESCE($14, total_amount),
             updated_at = $15
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(update.customer_id)
    .bind(&update.invoice_number)
    .bind(update.issue_date)
    .bind(update.due_date)
    .bind(update.taxable_date.is_some())
    .bind(update.taxable_date.flatten())
    .bind(update.variable_symbol.is_some())
    .bind(update.variable_symbol.clone().flatten())
    .bind(&update.currency)
    .bind(update.notes.is_some())
    .bind(update.notes.clone().flatten())
    .bind(update.is_paid)
    .bind(priced.map(|p| p.total))
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;

    if updated.is_none() {
        return Ok(None);
    }
    if let Some(priced) = priced {
        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, id, priced).await?;
    }
    tx.commit().await?;
    Ok(updated)
}

/// Flip `is_paid`
pub async fn toggle_paid(pool: &PgPool, id: i64, now: i64) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE invoices SET is_paid = NOT is_paid, updated_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::insert_user;
    use chrono::NaiveDate;
    use shared::models::{Customer, UserRole, next_invoice_number};

    async fn seed(pool: &PgPool) -> sqlx::Result<()> {
        insert_user(pool, 10, UserRole::Company, None).await?;
        let customer = Customer {
            id: 20,
            user_id: 10,
            name: "Odběratel s.r.o.".into(),
            ico: None,
            dic: None,
            address: None,
            city: None,
            zip: None,
            email: None,
            phone: None,
            created_at: 1,
            updated_at: 1,
        };
        crate::db::customers::create(pool, &customer).await
    }

    async fn issue(pool: &PgPool, id: i64, number: &str) -> sqlx::Result<Invoice> {
        let items = [InvoiceItemInput {
            description: "Úklid".into(),
            quantity: Decimal::from(2),
            unit: Some("h".into()),
            unit_price: Decimal::from(150),
        }];
        let priced = PricedItems {
            items: &items,
            totals: vec![Decimal::from(300)],
            total: Decimal::from(300),
        };
        let day = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        let invoice = Invoice {
            id,
            user_id: 10,
            customer_id: 20,
            invoice_number: number.into(),
            issue_date: day,
            due_date: day,
            taxable_date: Some(day),
            variable_symbol: Some(number.into()),
            currency: "CZK".into(),
            is_paid: false,
            notes: Some("Děkujeme".into()),
            total_amount: Decimal::ZERO,
            created_at: 1,
            updated_at: 1,
        };
        create(pool, &invoice, &priced).await
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_numbering_continues_past_four_digits(pool: PgPool) -> sqlx::Result<()> {
        seed(&pool).await?;
        issue(&pool, 1, "20269999").await?;
        let last = last_number(&pool, 10, 2026).await?;
        assert_eq!(last.as_deref(), Some("20269999"));

        let next = next_invoice_number(2026, last.as_deref());
        issue(&pool, 2, &next).await?;
        let last = last_number(&pool, 10, 2026).await?;
        assert_eq!(last.as_deref(), Some("202610000"));
        assert_eq!(next_invoice_number(2026, last.as_deref()), "202610001");
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_update_clears_optional_fields(pool: PgPool) -> sqlx::Result<()> {
        seed(&pool).await?;
        let created = issue(&pool, 1, "20260001").await?;
        assert_eq!(created.total_amount, Decimal::from(300));

        let patch = InvoiceUpdate {
            taxable_date: Some(None),
            notes: Some(None),
            ..Default::default()
        };
        let updated = update(&pool, 1, &patch, None, 2).await?.unwrap();
        assert_eq!(updated.taxable_date, None);
        assert_eq!(updated.notes, None);
        assert_eq!(updated.variable_symbol.as_deref(), Some("20260001"));
        assert_eq!(updated.total_amount, Decimal::from(300));
        Ok(())
    }
}
