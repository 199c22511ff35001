//! Shifts

use shared::models::{Shift, ShiftDetail, ShiftQuery};
use sqlx::PgPool;

use super::Scope;

const DETAIL_SELECT: &str = "SELECT s.id, s.workplace_id, w.name AS workplace_name, s.user_id,
        u.first_name || ' ' || u.last_name AS worker_name,
        s.date, s.start_time, s.end_time, s.notes, s.created_at, s.updated_at
     FROM shifts s
     JOIN workplaces w ON w.id = s.workplace_id
     LEFT JOIN users u ON u.id = s.user_id";

/// Company scope covers shifts at the company's workplaces
pub async fn list(
    pool: &PgPool,
    scope: Scope,
    query: &ShiftQuery,
) -> Result<Vec<ShiftDetail>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(&format!(
        "{DETAIL_SELECT}
         WHERE ($1::BIGINT IS NULL OR w.owner_id = $1)
           AND ($2::BIGINT IS NULL OR s.user_id = $2)
           AND ($3::DATE IS NULL OR s.date >= $3)
           AND ($4::DATE IS NULL OR s.date <= $4)
           AND ($5::BIGINT IS NULL OR s.workplace_id = $5)
           AND ($6::BIGINT IS NULL OR s.user_id = $6)
         ORDER BY s.date, s.start_time"
    ))
    .bind(company)
    .bind(user)
    .bind(query.from)
    .bind(query.to)
    .bind(query.workplace_id)
    .bind(query.user_id)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Shift>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM shifts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_detail(pool: &PgPool, id: i64) -> Result<Option<ShiftDetail>, sqlx::Error> {
    sqlx::query_as(&format!("{DETAIL_SELECT} WHERE s.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, shift: &Shift) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO shifts (id, workplace_id, user_id, date, start_time, end_time, notes, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(shift.id)
    .bind(shift.workplace_id)
    .bind(shift.user_id)
    .bind(shift.date)
    .bind(shift.start_time)
    .bind(shift.end_time)
    .bind(&shift.notes)
    .bind(shift.created_at)
    .bind(shift.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Persist every mutable column of an already-merged shift
pub async fn save(pool: &PgPool, shift: &Shift) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE shifts SET workplace_id = $2, user_id = $3, date = $4, start_time = $5,
             end_time = $6, notes = $7, updated_at = $8
         WHERE id = $1",
    )
    .bind(shift.id)
    .bind(shift.workplace_id)
    .bind(shift.user_id)
    .bind(shift.date)
    .bind(shift.start_time)
    .bind(shift.end_time)
    .bind(&shift.notes)
    .bind(shift.updated_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM shifts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
