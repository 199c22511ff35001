//! Shift Model
//!
//! A shift is a block of work at a workplace on a given day. `user_id` is
//! the assigned worker; `None` leaves the shift open.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::double_option;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Shift entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Shift {
    pub id: i64,
    pub workplace_id: i64,
    pub user_id: Option<i64>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    /// End time; a value not after `start_time` means the shift ends on the next day
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Shift {
    /// Length of the shift in hours
    pub fn hours(&self) -> Decimal {
        shift_hours(self.start_time, self.end_time)
    }
}

/// Hours between two wall-clock times, wrapping past midnight when
/// `end <= start`.
pub fn shift_hours(start: NaiveTime, end: NaiveTime) -> Decimal {
    let mut secs = (end - start).num_seconds();
    if secs <= 0 {
        secs += SECONDS_PER_DAY;
    }
    (Decimal::from(secs) / Decimal::from(3600)).round_dp(2)
}

/// Shift joined with workplace and worker names (list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShiftDetail {
    pub id: i64,
    pub workplace_id: i64,
    pub workplace_name: String,
    pub user_id: Option<i64>,
    pub worker_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create shift payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShiftCreate {
    pub workplace_id: i64,
    pub user_id: Option<i64>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Update shift payload
///
/// `user_id: null` unassigns the shift, an absent `user_id` leaves it as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ShiftUpdate {
    pub workplace_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_id: Option<Option<i64>>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Shift list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub workplace_id: Option<i64>,
    pub user_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_day_shift_hours() {
        assert_eq!(shift_hours(t(8, 0), t(16, 30)), Decimal::from_str("8.5").unwrap());
    }

    #[test]
    fn test_overnight_shift_hours() {
        assert_eq!(shift_hours(t(22, 0), t(6, 0)), Decimal::from(8));
        assert_eq!(shift_hours(t(18, 15), t(2, 0)), Decimal::from_str("7.75").unwrap());
    }

    #[test]
    fn test_equal_times_is_full_day() {
        assert_eq!(shift_hours(t(7, 0), t(7, 0)), Decimal::from(24));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: ShiftUpdate = serde_json::from_str(r#"{"notes":"x"}"#).unwrap();
        assert_eq!(absent.user_id, None);

        let cleared: ShiftUpdate = serde_json::from_str(r#"{"user_id":null}"#).unwrap();
        assert_eq!(cleared.user_id, Some(None));

        let assigned: ShiftUpdate = serde_json::from_str(r#"{"user_id":7}"#).unwrap();
        assert_eq!(assigned.user_id, Some(Some(7)));
    }

    #[test]
    fn test_shift_wire_format() {
        let shift = Shift {
            id: 1,
            workplace_id: 2,
            user_id: Some(3),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            start_time: t(6, 0),
            end_time: t(14, 0),
            notes: None,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(&shift).unwrap();
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["start_time"], "06:00:00");
        assert_eq!(shift.hours(), Decimal::from(8));
    }
}
