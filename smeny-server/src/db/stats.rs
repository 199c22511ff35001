//! Dashboard numbers

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use shared::models::{DashboardStats, shift_hours};
use sqlx::PgPool;

use super::{Scope, reports, scope_filter};

/// Statistics for the caller's scope as of `today`
pub async fn dashboard(
    pool: &PgPool,
    scope: Scope,
    today: NaiveDate,
) -> Result<DashboardStats, sqlx::Error> {
    let (company, user) = scope.binds();
    let month_start = today.with_day(1).unwrap_or(today);
    let next_month = reports::month_range(&month_start.format("%Y-%m").to_string())
        .map(|(_, end)| end)
        .unwrap_or(today);

    let month_shifts = reports::worked_shifts(pool, scope, month_start, next_month).await?;
    let hours_this_month: Decimal = month_shifts
        .iter()
        .map(|s| shift_hours(s.start_time, s.end_time))
        .sum();

    let (upcoming_shifts,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM shifts s JOIN workplaces w ON w.id = s.workplace_id
         WHERE ($1::BIGINT IS NULL OR w.owner_id = $1)
           AND ($2::BIGINT IS NULL OR s.user_id = $2)
           AND s.date >= $3 AND s.date <= $4",
    )
    .bind(company)
    .bind(user)
    .bind(today)
    .bind(today + Duration::days(7))
    .fetch_one(pool)
    .await?;

    let (pending_exchange_requests,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM exchange_requests r
         JOIN users ru ON ru.id = r.requester_id
         WHERE r.status = 'pending'
           AND ($1::BIGINT IS NULL OR ru.parent_company_id = $1)
           AND ($2::BIGINT IS NULL OR r.requester_id = $2 OR r.requestee_id = $2)",
    )
    .bind(company)
    .bind(user)
    .fetch_one(pool)
    .await?;

    let (unpaid_invoices, unpaid_amount): (i64, Option<Decimal>) = sqlx::query_as(&format!(
        "SELECT COUNT(*), SUM(i.total_amount) FROM invoices i WHERE NOT i.is_paid AND {}",
        scope_filter("i.user_id")
    ))
    .bind(company)
    .bind(user)
    .fetch_one(pool)
    .await?;

    let workers = match scope {
        Scope::All => {
            let (n,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'worker' AND is_active")
                    .fetch_one(pool)
                    .await?;
            n
        }
        Scope::Company(id) => {
            let (n,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM users WHERE role = 'worker' AND is_active AND parent_company_id = $1",
            )
            .bind(id)
            .fetch_one(pool)
            .await?;
            n
        }
        Scope::User(_) => 0,
    };

    Ok(DashboardStats {
        shifts_this_month: month_shifts.len() as i64,
        hours_this_month,
        upcoming_shifts,
        pending_exchange_requests,
        unpaid_invoices,
        unpaid_amount: unpaid_amount.unwrap_or(Decimal::ZERO),
        workers,
    })
}
