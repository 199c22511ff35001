//! Customers (invoice recipients)

use shared::models::{Customer, CustomerUpdate};
use sqlx::PgPool;

use super::{Scope, scope_filter};

pub async fn list(pool: &PgPool, scope: Scope) -> Result<Vec<Customer>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(&format!(
        "SELECT c.* FROM customers c WHERE {} ORDER BY c.name",
        scope_filter("c.user_id")
    ))
    .bind(company)
    .bind(user)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, customer: &Customer) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO customers (id, user_id, name, ico, dic, address, city, zip, email, phone, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(customer.id)
    .bind(customer.user_id)
    .bind(&customer.name)
    .bind(&customer.ico)
    .bind(&customer.dic)
    .bind(&customer.address)
    .bind(&customer.city)
    .bind(&customer.zip)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &CustomerUpdate,
    now: i64,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE customers SET
             name = COALESCE($2, name),
             ico = COALESCE($3, ico),
             dic = COALESCE($4, dic),
             address = COALESCE($5, address),
             city = COALESCE($6, city),
             zip = COALESCE($7, zip),
             email = COALESCE($8, email),
             phone = COALESCE($9, phone),
             updated_at = $10
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&update.name)
    .bind(&update.ico)
    .bind(&update.dic)
    .bind(&update.address)
    .bind(&update.city)
    .bind(&update.zip)
    .bind(&update.email)
    .bind(&update.phone)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn has_invoices(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM invoices WHERE customer_id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
