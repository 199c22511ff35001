//! Worker reports and monthly hours

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use shared::models::{MonthlyHours, Report, ReportUpdate, WorkerHours, payroll::gross_pay, shift_hours};
use sqlx::PgPool;

use super::{Scope, scope_filter};

pub async fn list(pool: &PgPool, scope: Scope) -> Result<Vec<Report>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(&format!(
        "SELECT r.* FROM reports r WHERE {} ORDER BY r.date DESC, r.created_at DESC",
        scope_filter("r.user_id")
    ))
    .bind(company)
    .bind(user)
    .fetch_all(pool)
    .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Report>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reports WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, report: &Report) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO reports (id, user_id, shift_id, date, title, content, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(report.id)
    .bind(report.user_id)
    .bind(report.shift_id)
    .bind(report.date)
    .bind(&report.title)
    .bind(&report.content)
    .bind(report.created_at)
    .bind(report.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &ReportUpdate,
    now: i64,
) -> Result<Option<Report>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE reports SET
             shift_id = COALESCE($2, shift_id),
             date = COALESCE($3, date),
             title = COALESCE($4, title),
             content = COALESCE($5, content),
             updated_at = $6
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(update.shift_id)
    .bind(update.date)
    .bind(&update.title)
    .bind(&update.content)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reports WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Monthly hours ──

/// One assigned shift with its worker
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkedShift {
    pub user_id: i64,
    pub worker_name: String,
    pub hourly_rate: Option<Decimal>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Assigned shifts dated in `[from, to)`; company scope covers its workplaces
pub async fn worked_shifts(
    pool: &PgPool,
    scope: Scope,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<WorkedShift>, sqlx::Error> {
    let (company, user) = scope.binds();
    sqlx::query_as(
        "SELECT s.user_id, u.first_name || ' ' || u.last_name AS worker_name, u.hourly_rate,
                s.start_time, s.end_time
         FROM shifts s
         JOIN workplaces w ON w.id = s.workplace_id
         JOIN users u ON u.id = s.user_id
         WHERE ($1::BIGINT IS NULL OR w.owner_id = $1)
           AND ($2::BIGINT IS NULL OR s.user_id = $2)
           AND s.date >= $3 AND s.date < $4",
    )
    .bind(company)
    .bind(user)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Per-worker hours and earnings, ordered by worker name
pub fn aggregate_hours(month: &str, shifts: &[WorkedShift]) -> MonthlyHours {
    let mut per_worker: BTreeMap<(String, i64), WorkerHours> = BTreeMap::new();
    for shift in shifts {
        let entry = per_worker
            .entry((shift.worker_name.clone(), shift.user_id))
            .or_insert_with(|| WorkerHours {
                user_id: shift.user_id,
                worker_name: shift.worker_name.clone(),
                shift_count: 0,
                hours: Decimal::ZERO,
                hourly_rate: shift.hourly_rate,
                earnings: Decimal::ZERO,
            });
        entry.shift_count += 1;
        entry.hours += shift_hours(shift.start_time, shift.end_time);
    }

    let workers: Vec<WorkerHours> = per_worker
        .into_values()
        .map(|mut w| {
            w.earnings = w
                .hourly_rate
                .map(|rate| gross_pay(w.hours, rate))
                .unwrap_or(Decimal::ZERO);
            w
        })
        .collect();

    MonthlyHours {
        month: month.to_string(),
        total_hours: workers.iter().map(|w| w.hours).sum(),
        total_earnings: workers.iter().map(|w| w.earnings).sum(),
        workers,
    }
}

/// Parse `YYYY-MM` into `[first day, first day of next month)`
pub fn month_range(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (year, mon) = month.split_once('-')?;
    if year.len() != 4 || mon.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let mon: u32 = mon.parse().ok()?;
    let start = NaiveDate::from_ymd_opt(year, mon, 1)?;
    let end = if mon == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, mon + 1, 1)?
    };
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn shift(user_id: i64, name: &str, rate: Option<&str>, start: &str, end: &str) -> WorkedShift {
        WorkedShift {
            user_id,
            worker_name: name.into(),
            hourly_rate: rate.map(|r| Decimal::from_str(r).unwrap()),
            start_time: t(start),
            end_time: t(end),
        }
    }

    #[test]
    fn test_month_range() {
        let (from, to) = month_range("2026-02").unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

        let (_, to) = month_range("2025-12").unwrap();
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        assert!(month_range("2026-13").is_none());
        assert!(month_range("2026-1").is_none());
        assert!(month_range("garbage").is_none());
    }

    #[test]
    fn test_aggregate_hours_per_worker() {
        let shifts = vec![
            shift(2, "Eva Malá", Some("200"), "08:00", "16:00"),
            shift(1, "Adam Novák", Some("150.50"), "22:00", "06:00"),
            shift(2, "Eva Malá", Some("200"), "08:00", "12:30"),
            shift(3, "Jan Bez", None, "10:00", "11:00"),
        ];
        let result = aggregate_hours("2026-03", &shifts);

        assert_eq!(result.month, "2026-03");
        assert_eq!(result.workers.len(), 3);

        let adam = &result.workers[0];
        assert_eq!(adam.worker_name, "Adam Novák");
        assert_eq!(adam.hours, Decimal::from(8));
        assert_eq!(adam.earnings, Decimal::from_str("1204.00").unwrap());

        let eva = &result.workers[1];
        assert_eq!(eva.shift_count, 2);
        assert_eq!(eva.hours, Decimal::from_str("12.5").unwrap());
        assert_eq!(eva.earnings, Decimal::from(2500));

        let jan = &result.workers[2];
        assert_eq!(jan.earnings, Decimal::ZERO);

        assert_eq!(result.total_hours, Decimal::from_str("21.5").unwrap());
        assert_eq!(result.total_earnings, Decimal::from(3704));
    }

    #[test]
    fn test_aggregate_empty_month() {
        let result = aggregate_hours("2026-01", &[]);
        assert!(result.workers.is_empty());
        assert_eq!(result.total_hours, Decimal::ZERO);
    }
}
