//! Document metadata

use shared::models::Document;
use sqlx::PgPool;

use super::{Scope, scope_filter};

pub async fn list(pool: &PgPool, scope: Scope) -> Result<Vec<Document>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(&format!(
        "SELECT d.* FROM documents d WHERE {} ORDER BY d.created_at DESC",
        scope_filter("d.user_id")
    ))
    .bind(company)
    .bind(user)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Document>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM documents WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, doc: &Document) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO documents (id, user_id, name, original_name, mime_type, size_bytes, sha256,
             storage_key, description, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(doc.id)
    .bind(doc.user_id)
    .bind(&doc.name)
    .bind(&doc.original_name)
    .bind(&doc.mime_type)
    .bind(doc.size_bytes)
    .bind(&doc.sha256)
    .bind(&doc.storage_key)
    .bind(&doc.description)
    .bind(doc.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete the row and return its storage key
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("DELETE FROM documents WHERE id = $1 RETURNING storage_key")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(key,)| key))
}
