//! Payroll runs
//!
//! A run is computed from the company's attendance in its period and
//! written (run + lines) in one transaction.

use chrono::NaiveDate;
use shared::models::{EmployeeHours, PayrollLine, PayrollRun, PayrollStatus, build_lines};
use shared::util::snowflake_id;
use sqlx::PgPool;

pub async fn list(pool: &PgPool, company_id: Option<i64>) -> Result<Vec<PayrollRun>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM payroll_runs WHERE ($1::BIGINT IS NULL OR company_id = $1)
         ORDER BY period_start DESC, created_at DESC",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<PayrollRun>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payroll_runs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn lines(pool: &PgPool, payroll_id: i64) -> Result<Vec<PayrollLine>, sqlx::Error> {
    sqlx::query_as(
        "SELECT l.id, l.payroll_id, l.employee_id,
                e.first_name || ' ' || e.last_name AS employee_name,
                l.hours, l.hourly_rate, l.gross
         FROM payroll_lines l JOIN employees e ON e.id = l.employee_id
         WHERE l.payroll_id = $1
         ORDER BY e.last_name, e.first_name",
    )
    .bind(payroll_id)
    .fetch_all(pool)
    .await
}

/// Compute and store a draft run; `None` when nobody has hours in the period
pub async fn create_run(
    pool: &PgPool,
    company_id: i64,
    period_start: NaiveDate,
    period_end: NaiveDate,
    now: i64,
) -> Result<Option<PayrollRun>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let hours: Vec<EmployeeHours> = sqlx::query_as(
        "SELECT e.id AS employee_id, SUM(a.hours) AS hours, e.hourly_rate
         FROM attendance a JOIN employees e ON e.id = a.employee_id
         WHERE a.company_id = $1 AND a.date >= $2 AND a.date <= $3
         GROUP BY e.id, e.hourly_rate
         ORDER BY e.id",
    )
    .bind(company_id)
    .bind(period_start)
    .bind(period_end)
    .fetch_all(&mut *tx)
    .await?;

    let (lines, total) = build_lines(hours);
    if lines.is_empty() {
        return Ok(None);
    }

    let run: PayrollRun = sqlx::query_as(
        "INSERT INTO payroll_runs (id, company_id, period_start, period_end, status, total_gross, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(snowflake_id())
    .bind(company_id)
    .bind(period_start)
    .bind(period_end)
    .bind(PayrollStatus::Draft)
    .bind(total)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO payroll_lines (id, payroll_id, employee_id, hours, hourly_rate, gross)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(snowflake_id())
        .bind(run.id)
        .bind(line.employee_id)
        .bind(line.hours)
        .bind(line.hourly_rate)
        .bind(line.gross)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(Some(run))
}

/// Draft → finalized; `None` when the run is not a draft
pub async fn finalize(pool: &PgPool, id: i64) -> Result<Option<PayrollRun>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE payroll_runs SET status = 'finalized' WHERE id = $1 AND status = 'draft' RETURNING *",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a draft run; finalized runs are kept
pub async fn delete_draft(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM payroll_runs WHERE id = $1 AND status = 'draft'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Login accounts linked to the run's employees
pub async fn linked_users(pool: &PgPool, payroll_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT DISTINCT e.user_id FROM payroll_lines l JOIN employees e ON e.id = l.employee_id
         WHERE l.payroll_id = $1 AND e.user_id IS NOT NULL",
    )
    .bind(payroll_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
