//! Employee Model (workflow manager)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Employee entity; `user_id` links an optional login account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub company_id: i64,
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub position: Option<String>,
    pub hourly_rate: Decimal,
    pub is_active: bool,
    pub hired_on: Option<NaiveDate>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmployeeCreate {
    pub user_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    pub hourly_rate: Decimal,
    pub hired_on: Option<NaiveDate>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EmployeeUpdate {
    pub user_id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
    pub hired_on: Option<NaiveDate>,
}
