//! Approval Model (workflow manager)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::exchange_request::RequestStatus;

/// What is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "approval_kind", rename_all = "lowercase"))]
pub enum ApprovalKind {
    Leave,
    Expense,
    Overtime,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Approval {
    pub id: i64,
    pub company_id: i64,
    pub requested_by: i64,
    pub kind: ApprovalKind,
    pub subject: String,
    pub detail: Option<String>,
    pub amount: Option<Decimal>,
    pub status: RequestStatus,
    pub decided_by: Option<i64>,
    pub decided_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApprovalCreate {
    pub kind: ApprovalKind,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(max = 2000))]
    pub detail: Option<String>,
    pub amount: Option<Decimal>,
}

/// Decision payload; only `approved` or `rejected` are accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub status: RequestStatus,
}
