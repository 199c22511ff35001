//! User accounts (admins, companies, workers)

use shared::models::{ProfileUpdate, User, UserRole, WorkerUpdate};
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, phone, role, \
     parent_company_id, company_name, company_ico, company_dic, company_address, hourly_rate, \
     is_active, created_at, updated_at";

pub async fn create(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, first_name, last_name, phone, role,
             parent_company_id, company_name, company_ico, company_dic, company_address, hourly_rate,
             is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.phone)
    .bind(user.role)
    .bind(user.parent_company_id)
    .bind(&user.company_name)
    .bind(&user.company_ico)
    .bind(&user.company_dic)
    .bind(&user.company_address)
    .bind(user.hourly_rate)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All accounts, newest first
pub async fn list_page(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Look up by username or e-mail (case-insensitive e-mail)
pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR LOWER(email) = LOWER($1) LIMIT 1"
    ))
    .bind(login)
    .fetch_optional(pool)
    .await
}

pub async fn username_taken(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn email_taken(pool: &PgPool, email: &str, except: Option<i64>) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(email)
    .bind(except)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Active company account by id
pub async fn find_company(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = 'company' AND is_active"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    update: &ProfileUpdate,
    now: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE users SET
             email = COALESCE($2, email),
             first_name = COALESCE($3, first_name),
             last_name = COALESCE($4, last_name),
             phone = COALESCE($5, phone),
             company_name = COALESCE($6, company_name),
             company_ico = COALESCE($7, company_ico),
             company_dic = COALESCE($8, company_dic),
             company_address = COALESCE($9, company_address),
             updated_at = $10
         WHERE id = $1
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(&update.email)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.phone)
    .bind(&update.company_name)
    .bind(&update.company_ico)
    .bind(&update.company_dic)
    .bind(&update.company_address)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn update_password(
    pool: &PgPool,
    id: i64,
    password_hash: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}

// ── Workers ──

/// Workers of a company; `None` lists every worker (admin)
pub async fn list_workers(pool: &PgPool, company_id: Option<i64>) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE role = 'worker' AND ($1::BIGINT IS NULL OR parent_company_id = $1)
         ORDER BY last_name, first_name"
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await
}

/// Worker by id, restricted to a company when `company_id` is set
pub async fn find_worker(
    pool: &PgPool,
    id: i64,
    company_id: Option<i64>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE id = $1 AND role = 'worker' AND ($2::BIGINT IS NULL OR parent_company_id = $2)"
    ))
    .bind(id)
    .bind(company_id)
    .fetch_optional(pool)
    .await
}

pub async fn update_worker(
    pool: &PgPool,
    id: i64,
    update: &WorkerUpdate,
    now: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE users SET
             first_name = COALESCE($2, first_name),
             last_name = COALESCE($3, last_name),
             phone = COALESCE($4, phone),
             hourly_rate = COALESCE($5, hourly_rate),
             is_active = COALESCE($6, is_active),
             updated_at = $7
         WHERE id = $1 AND role = 'worker'
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.phone)
    .bind(update.hourly_rate)
    .bind(update.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn deactivate(pool: &PgPool, id: i64, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET is_active = FALSE, updated_at = $2 WHERE id = $1")
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn has_shifts(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM shifts WHERE user_id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Company a user belongs to: itself for a company, the parent for a worker
pub async fn company_of(pool: &PgPool, id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(UserRole, Option<i64>)> =
        sqlx::query_as("SELECT role, parent_company_id FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(role, parent)| match role {
        UserRole::Company => Some(id),
        UserRole::Worker => parent,
        UserRole::Admin => None,
    }))
}
