//! Audit log operations

use shared::models::AuditEntry;
use sqlx::PgPool;

use crate::error::BoxError;

/// Write an audit log entry
pub async fn log(
    pool: &PgPool,
    user_id: Option<i64>,
    action: &str,
    detail: Option<&serde_json::Value>,
    ip_address: Option<&str>,
    now: i64,
) -> Result<(), BoxError> {
    sqlx::query(
        "INSERT INTO audit_logs (user_id, action, detail, ip_address, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(action)
    .bind(detail)
    .bind(ip_address)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Log and swallow failures; audit writes never fail the request
pub async fn record(
    pool: &PgPool,
    user_id: Option<i64>,
    action: &str,
    detail: Option<serde_json::Value>,
    ip_address: Option<&str>,
) {
    let now = shared::util::now_millis();
    if let Err(e) = log(pool, user_id, action, detail.as_ref(), ip_address, now).await {
        tracing::warn!(action, error = %e, "Failed to write audit log");
    }
}

/// Newest entries first
pub async fn query(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<AuditEntry>, BoxError> {
    let rows: Vec<AuditEntry> = sqlx::query_as(
        "SELECT id, user_id, action, detail, ip_address, created_at FROM audit_logs ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count(pool: &PgPool) -> Result<i64, BoxError> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_logs")
        .fetch_one(pool)
        .await?;
    Ok(total)
}
