//! Workplaces

use shared::models::{Workplace, WorkplaceUpdate};
use sqlx::PgPool;

/// `owner_id = None` lists every workplace
pub async fn list(pool: &PgPool, owner_id: Option<i64>) -> Result<Vec<Workplace>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM workplaces WHERE ($1::BIGINT IS NULL OR owner_id = $1) ORDER BY name",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Workplace>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM workplaces WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, workplace: &Workplace) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO workplaces (id, owner_id, name, address, notes, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(workplace.id)
    .bind(workplace.owner_id)
    .bind(&workplace.name)
    .bind(&workplace.address)
    .bind(&workplace.notes)
    .bind(workplace.created_at)
    .bind(workplace.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &WorkplaceUpdate,
    now: i64,
) -> Result<Option<Workplace>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE workplaces SET
             name = COALESCE($2, name),
             address = CASE WHEN $3 THEN $4 ELSE address END,
             notes = CASE WHEN $5 THEN $6 ELSE notes END,
             updated_at = $7
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&update.name)
    .bind(update.address.is_some())
    .bind(update.address.clone().flatten())
    .bind(update.notes.is_some())
    .bind(update.notes.clone().flatten())
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn has_shifts(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM shifts WHERE workplace_id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM workplaces WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{insert_user, insert_workplace};
    use shared::models::UserRole;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_update_clears_or_keeps_optional_fields(pool: PgPool) -> sqlx::Result<()> {
        insert_user(&pool, 10, UserRole::Company, None).await?;
        let before = insert_workplace(&pool, 1, 10).await?;

        let patch = WorkplaceUpdate {
            address: Some(None),
            ..Default::default()
        };
        let updated = update(&pool, 1, &patch, 2).await?.unwrap();
        assert_eq!(updated.address, None);
        assert_eq!(updated.notes, before.notes);
        assert_eq!(updated.name, before.name);

        assert!(update(&pool, 999, &patch, 2).await?.is_none());
        assert!(!delete(&pool, 999).await?);
        Ok(())
    }
}
