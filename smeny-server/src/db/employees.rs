//! Workflow employees

use shared::models::{Employee, EmployeeUpdate};
use sqlx::PgPool;

use super::Scope;

/// Company: its employees. Worker: employee rows linked to the account.
pub async fn list(pool: &PgPool, scope: Scope) -> Result<Vec<Employee>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(
        "SELECT * FROM employees
         WHERE ($1::BIGINT IS NULL OR company_id = $1) AND ($2::BIGINT IS NULL OR user_id = $2)
         ORDER BY last_name, first_name",
    )
    .bind(company)
    .bind(user)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, e: &Employee) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO employees (id, company_id, user_id, first_name, last_name, email, position,
             hourly_rate, is_active, hired_on, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(e.id)
    .bind(e.company_id)
    .bind(e.user_id)
    .bind(&e.first_name)
    .bind(&e.last_name)
    .bind(&e.email)
    .bind(&e.position)
    .bind(e.hourly_rate)
    .bind(e.is_active)
    .bind(e.hired_on)
    .bind(e.created_at)
    .bind(e.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &EmployeeUpdate,
    now: i64,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE employees SET
             user_id = COALESCE($2, user_id),
             first_name = COALESCE($3, first_name),
             last_name = COALESCE($4, last_name),
             email = COALESCE($5, email),
             position = COALESCE($6, position),
             hourly_rate = COALESCE($7, hourly_rate),
             is_active = COALESCE($8, is_active),
             hired_on = COALESCE($9, hired_on),
             updated_at = $10
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(update.user_id)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.email)
    .bind(&update.position)
    .bind(update.hourly_rate)
    .bind(update.is_active)
    .bind(update.hired_on)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
