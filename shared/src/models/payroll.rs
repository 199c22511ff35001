//! Payroll Model (workflow manager)
//!
//! A run covers a date period. Each line holds one employee's attended
//! hours in that period and `gross = hours × hourly_rate` (2 dp); the run's
//! `total_gross` is the sum of its lines.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Payroll run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "payroll_status", rename_all = "lowercase"))]
pub enum PayrollStatus {
    Draft,
    Finalized,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PayrollRun {
    pub id: i64,
    pub company_id: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub status: PayrollStatus,
    pub total_gross: Decimal,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PayrollLine {
    pub id: i64,
    pub payroll_id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub gross: Decimal,
}

/// Run with its lines (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunDetail {
    #[serde(flatten)]
    pub run: PayrollRun,
    pub lines: Vec<PayrollLine>,
}

/// `POST /api/wf/payroll/run` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunCreate {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Attendance aggregated per employee over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmployeeHours {
    pub employee_id: i64,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
}

/// Line computed before it is persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollLineDraft {
    pub employee_id: i64,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub gross: Decimal,
}

pub fn gross_pay(hours: Decimal, hourly_rate: Decimal) -> Decimal {
    (hours * hourly_rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One line per employee with positive hours, plus the run total
pub fn build_lines(
    entries: impl IntoIterator<Item = EmployeeHours>,
) -> (Vec<PayrollLineDraft>, Decimal) {
    let lines: Vec<PayrollLineDraft> = entries
        .into_iter()
        .filter(|e| e.hours > Decimal::ZERO)
        .map(|e| PayrollLineDraft {
            employee_id: e.employee_id,
            gross: gross_pay(e.hours, e.hourly_rate),
            hours: e.hours,
            hourly_rate: e.hourly_rate,
        })
        .collect();
    let total = lines.iter().map(|l| l.gross).sum();
    (lines, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_gross_pay() {
        assert_eq!(gross_pay(d("7.5"), d("200")), d("1500"));
        assert_eq!(gross_pay(d("1.333"), d("3")), d("4.00"));
    }

    #[test]
    fn test_build_lines_skips_idle_employees() {
        let (lines, total) = build_lines(vec![
            EmployeeHours {
                employee_id: 1,
                hours: d("40"),
                hourly_rate: d("180.50"),
            },
            EmployeeHours {
                employee_id: 2,
                hours: Decimal::ZERO,
                hourly_rate: d("300"),
            },
            EmployeeHours {
                employee_id: 3,
                hours: d("12.25"),
                hourly_rate: d("220"),
            },
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].gross, d("7220"));
        assert_eq!(lines[1].employee_id, 3);
        assert_eq!(lines[1].gross, d("2695"));
        assert_eq!(total, d("9915"));
    }

    #[test]
    fn test_build_lines_empty() {
        let (lines, total) = build_lines(Vec::new());
        assert!(lines.is_empty());
        assert_eq!(total, Decimal::ZERO);
    }
}
