//! User notifications

use shared::models::Notification;
use shared::util::snowflake_id;
use sqlx::PgPool;

pub async fn list(
    pool: &PgPool,
    user_id: i64,
    unread_only: bool,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM notifications WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .bind(unread_only)
    .fetch_all(pool)
    .await
}

/// Notify a user. Runs after the state change it reports has been
/// committed, so a failed write is logged and not returned.
pub async fn notify(pool: &PgPool, user_id: i64, title: &str, body: &str, now: i64) {
    if let Err(e) = insert(pool, user_id, title, body, now).await {
        tracing::warn!(user_id, title, error = %e, "Failed to write notification");
    }
}

async fn insert(
    pool: &PgPool,
    user_id: i64,
    title: &str,
    body: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notifications (id, user_id, title, body, is_read, created_at)
         VALUES ($1, $2, $3, $4, FALSE, $5)",
    )
    .bind(snowflake_id())
    .bind(user_id)
    .bind(title)
    .bind(body)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark one of the user's notifications read
pub async fn mark_read(
    pool: &PgPool,
    id: i64,
    user_id: i64,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn mark_all_read(pool: &PgPool, user_id: i64) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
