//! Attendance Model (workflow manager)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attendance {
    pub id: i64,
    pub company_id: i64,
    pub employee_id: i64,
    pub project_id: Option<i64>,
    pub date: NaiveDate,
    pub hours: Decimal,
    pub note: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttendanceCreate {
    pub employee_id: i64,
    pub project_id: Option<i64>,
    pub date: NaiveDate,
    pub hours: Decimal,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Attendance list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceQuery {
    pub employee_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Hours must satisfy `0 < h <= 24`, in hundredths at most
pub fn hours_in_range(hours: Decimal) -> bool {
    hours > Decimal::ZERO && hours <= Decimal::from(24) && hours.normalize().scale() <= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_hours_range() {
        assert!(hours_in_range(Decimal::from_str("0.25").unwrap()));
        assert!(hours_in_range(Decimal::from(24)));
        assert!(!hours_in_range(Decimal::ZERO));
        assert!(!hours_in_range(Decimal::from_str("-1").unwrap()));
        assert!(!hours_in_range(Decimal::from_str("24.01").unwrap()));
        assert!(hours_in_range(Decimal::from_str("7.50").unwrap()));
        assert!(!hours_in_range(Decimal::from_str("7.125").unwrap()));
    }
}
