//! Exchange Request Model
//!
//! A worker proposes to swap one of their shifts with a coworker's shift.
//! Lifecycle: `pending` → `approved` | `rejected`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Exchange request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "request_status", rename_all = "lowercase"))]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Exchange request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ExchangeRequest {
    pub id: i64,
    pub requester_id: i64,
    pub requestee_id: i64,
    pub requester_shift_id: i64,
    pub requestee_shift_id: i64,
    pub status: RequestStatus,
    pub message: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Exchange request with both shifts and both workers resolved (list view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ExchangeRequestDetail {
    pub id: i64,
    pub requester_id: i64,
    pub requester_name: String,
    pub requestee_id: i64,
    pub requestee_name: String,
    pub requester_shift_id: i64,
    pub requester_shift_date: NaiveDate,
    pub requester_shift_start: NaiveTime,
    pub requester_shift_end: NaiveTime,
    pub requestee_shift_id: i64,
    pub requestee_shift_date: NaiveDate,
    pub requestee_shift_start: NaiveTime,
    pub requestee_shift_end: NaiveTime,
    pub status: RequestStatus,
    pub message: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create exchange request payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExchangeRequestCreate {
    pub requester_shift_id: i64,
    pub requestee_shift_id: i64,
    pub requestee_id: i64,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

/// Decision payload for `PUT /api/exchange-requests/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeDecision {
    pub status: RequestStatus,
}

/// A coworker's upcoming shift the caller may propose a swap with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AvailableShift {
    pub id: i64,
    pub workplace_id: i64,
    pub workplace_name: String,
    pub user_id: i64,
    pub worker_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
