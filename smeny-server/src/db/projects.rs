//! Workflow projects

use shared::models::{Project, ProjectQuery, ProjectUpdate};
use sqlx::PgPool;

pub async fn list(
    pool: &PgPool,
    company_id: Option<i64>,
    query: &ProjectQuery,
) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM projects
         WHERE ($1::BIGINT IS NULL OR company_id = $1)
           AND ($2::project_status IS NULL OR status = $2)
           AND ($3::BIGINT IS NULL OR client_id = $3)
         ORDER BY created_at DESC",
    )
    .bind(company_id)
    .bind(query.status)
    .bind(query.client_id)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, project: &Project) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO projects (id, company_id, client_id, name, description, status, budget, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(project.id)
    .bind(project.company_id)
    .bind(project.client_id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.status)
    .bind(project.budget)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &ProjectUpdate,
    now: i64,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE projects SET
             client_id = COALESCE($2, client_id),
             name = COALESCE($3, name),
             description = COALESCE($4, description),
             status = COALESCE($5, status),
             budget = COALESCE($6, budget),
             updated_at = $7
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(update.client_id)
    .bind(&update.name)
    .bind(&update.description)
    .bind(update.status)
    .bind(update.budget)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
