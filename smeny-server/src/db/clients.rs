//! Workflow clients

use shared::models::{Client, ClientUpdate};
use sqlx::PgPool;

pub async fn list(pool: &PgPool, company_id: Option<i64>) -> Result<Vec<Client>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM clients WHERE ($1::BIGINT IS NULL OR company_id = $1) ORDER BY name",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, client: &Client) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO clients (id, company_id, name, contact_email, contact_phone, notes, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(client.id)
    .bind(client.company_id)
    .bind(&client.name)
    .bind(&client.contact_email)
    .bind(&client.contact_phone)
    .bind(&client.notes)
    .bind(client.created_at)
    .bind(client.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &ClientUpdate,
    now: i64,
) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE clients SET
             name = COALESCE($2, name),
             contact_email = COALESCE($3, contact_email),
             contact_phone = COALESCE($4, contact_phone),
             notes = COALESCE($5, notes),
             updated_at = $6
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&update.name)
    .bind(&update.contact_email)
    .bind(&update.contact_phone)
    .bind(&update.notes)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
