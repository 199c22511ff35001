//! Employee Handlers
//!
//! An employee row may link to a worker login of the same company; that
//! worker can then read the row.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Employee, EmployeeCreate, EmployeeUpdate, numeric::RATE};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::wf::{company_context, ensure_manages};
use crate::api::{ApiResult, missing};
use crate::auth::CurrentUser;
use crate::db::{self, Scope};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{check_amount, normalize_optional};

fn check_rate(rate: Decimal) -> Result<(), AppError> {
    check_amount("hourly_rate", rate, RATE)
}

/// The linked login must be a worker of the same company
async fn check_link(state: &AppState, user_id: i64, company_id: i64) -> Result<(), ServiceError> {
    db::users::find_worker(&state.pool, user_id, Some(company_id))
        .await?
        .ok_or_else(|| missing(ErrorCode::WorkerNotFound, user_id))?;
    Ok(())
}

async fn load(state: &AppState, id: i64) -> Result<Employee, ServiceError> {
    Ok(db::employees::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::EmployeeNotFound, id))?)
}

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Employee>> {
    Ok(Json(
        db::employees::list(&state.pool, Scope::of(&user.user)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Employee> {
    let employee = load(&state, id).await?;
    if employee.user_id != Some(user.id()) {
        ensure_manages(&user, employee.company_id, "employee", id)?;
    }
    Ok(Json(employee))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<EmployeeCreate>,
) -> ApiResult<Employee> {
    payload.validate()?;
    check_rate(payload.hourly_rate)?;
    let company_id = company_context(&user)?;
    if let Some(linked) = payload.user_id {
        check_link(&state, linked, company_id).await?;
    }

    let now = now_millis();
    let employee = Employee {
        id: snowflake_id(),
        company_id,
        user_id: payload.user_id,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        email: normalize_optional(payload.email).map(|e| e.to_lowercase()),
        position: normalize_optional(payload.position),
        hourly_rate: payload.hourly_rate,
        is_active: true,
        hired_on: payload.hired_on,
        created_at: now,
        updated_at: now,
    };
    db::employees::create(&state.pool, &employee).await?;

    tracing::info!(employee_id = employee.id, company_id, "Employee created");
    Ok(Json(employee))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(mut payload): Json<EmployeeUpdate>,
) -> ApiResult<Employee> {
    payload.validate()?;
    if let Some(rate) = payload.hourly_rate {
        check_rate(rate)?;
    }
    let existing = load(&state, id).await?;
    ensure_manages(&user, existing.company_id, "employee", id)?;
    if let Some(linked) = payload.user_id {
        check_link(&state, linked, existing.company_id).await?;
    }
    payload.email = normalize_optional(payload.email).map(|e| e.to_lowercase());
    payload.position = normalize_optional(payload.position);

    let employee = db::employees::update(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::EmployeeNotFound, id))?;
    Ok(Json(employee))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    let existing = load(&state, id).await?;
    ensure_manages(&user, existing.company_id, "employee", id)?;
    if !db::employees::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::EmployeeNotFound, id).into());
    }
    tracing::info!(employee_id = id, "Employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_check_rate() {
        assert!(check_rate(Decimal::ZERO).is_ok());
        assert!(check_rate(Decimal::from_str("215.50").unwrap()).is_ok());
        assert_eq!(
            check_rate(Decimal::from_str("-1").unwrap()).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
        assert!(check_rate(Decimal::from_str("215.505").unwrap()).is_err());
        assert!(check_rate(Decimal::from(10_000_000_000i64)).is_err());
    }
}
