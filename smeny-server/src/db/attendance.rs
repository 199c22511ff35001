//! Attendance records

use shared::models::{Attendance, AttendanceQuery};
use sqlx::PgPool;

use super::Scope;

/// Worker scope: rows of employees linked to the account
pub async fn list(
    pool: &PgPool,
    scope: Scope,
    query: &AttendanceQuery,
) -> Result<Vec<Attendance>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(
        "SELECT a.* FROM attendance a
         JOIN employees e ON e.id = a.employee_id
         WHERE ($1::BIGINT IS NULL OR a.company_id = $1)
           AND ($2::BIGINT IS NULL OR e.user_id = $2)
           AND ($3::BIGINT IS NULL OR a.employee_id = $3)
           AND ($4::DATE IS NULL OR a.date >= $4)
           AND ($5::DATE IS NULL OR a.date <= $5)
         ORDER BY a.date DESC, a.created_at DESC",
    )
    .bind(company)
    .bind(user)
    .bind(query.employee_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM attendance WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, a: &Attendance) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO attendance (id, company_id, employee_id, project_id, date, hours, note, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(a.id)
    .bind(a.company_id)
    .bind(a.employee_id)
    .bind(a.project_id)
    .bind(a.date)
    .bind(a.hours)
    .bind(&a.note)
    .bind(a.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
