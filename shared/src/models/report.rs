//! Report Model (worker reports and monthly hours)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Worker report entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub shift_id: Option<i64>,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create report payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportCreate {
    pub shift_id: Option<i64>,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub content: String,
}

/// Update report payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReportUpdate {
    pub shift_id: Option<i64>,
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub content: Option<String>,
}

/// Hours and earnings of one worker for a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerHours {
    pub user_id: i64,
    pub worker_name: String,
    pub shift_count: i64,
    pub hours: Decimal,
    pub hourly_rate: Option<Decimal>,
    pub earnings: Decimal,
}

/// `GET /api/reports/hours` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyHours {
    /// `YYYY-MM`
    pub month: String,
    pub workers: Vec<WorkerHours>,
    pub total_hours: Decimal,
    pub total_earnings: Decimal,
}
