//! Approval requests

use shared::models::{Approval, RequestStatus};
use sqlx::PgPool;

use super::Scope;

/// Worker scope: own requests
pub async fn list(pool: &PgPool, scope: Scope) -> Result<Vec<Approval>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(
        "SELECT * FROM approvals
         WHERE ($1::BIGINT IS NULL OR company_id = $1) AND ($2::BIGINT IS NULL OR requested_by = $2)
         ORDER BY created_at DESC",
    )
    .bind(company)
    .bind(user)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Approval>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM approvals WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, a: &Approval) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO approvals (id, company_id, requested_by, kind, subject, detail, amount, status, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(a.id)
    .bind(a.company_id)
    .bind(a.requested_by)
    .bind(a.kind)
    .bind(&a.subject)
    .bind(&a.detail)
    .bind(a.amount)
    .bind(a.status)
    .bind(a.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Decide a pending approval; `None` when it was already decided
pub async fn decide(
    pool: &PgPool,
    id: i64,
    status: RequestStatus,
    decided_by: i64,
    now: i64,
) -> Result<Option<Approval>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE approvals SET status = $2, decided_by = $3, decided_at = $4
         WHERE id = $1 AND status = 'pending'
         RETURNING *",
    )
    .bind(id)
    .bind(status)
    .bind(decided_by)
    .bind(now)
    .fetch_optional(pool)
    .await
}
