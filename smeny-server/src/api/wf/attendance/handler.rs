//! Attendance Handlers
//!
//! Workers see attendance of the employee rows linked to their login.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Attendance, AttendanceCreate, AttendanceQuery, hours_in_range};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::wf::ensure_manages;
use crate::api::{ApiResult, missing};
use crate::auth::CurrentUser;
use crate::db::{self, Scope};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::normalize_optional;

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<AttendanceQuery>,
) -> ApiResult<Vec<Attendance>> {
    if matches!((query.from, query.to), (Some(from), Some(to)) if from > to) {
        return Err(AppError::validation("from must not be after to").into());
    }
    Ok(Json(
        db::attendance::list(&state.pool, Scope::of(&user.user), &query).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Attendance> {
    let record = db::attendance::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::AttendanceNotFound, id))?;
    let linked = db::employees::find(&state.pool, record.employee_id)
        .await?
        .and_then(|e| e.user_id)
        == Some(user.id());
    if !linked {
        ensure_manages(&user, record.company_id, "attendance", id)?;
    }
    Ok(Json(record))
}

/// Record hours for an employee; the record joins the employee's company
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<AttendanceCreate>,
) -> ApiResult<Attendance> {
    payload.validate()?;
    if !hours_in_range(payload.hours) {
        return Err(AppError::new(ErrorCode::InvalidHours)
            .with_detail("hours", payload.hours.to_string())
            .into());
    }

    let employee = db::employees::find(&state.pool, payload.employee_id)
        .await?
        .ok_or_else(|| missing(ErrorCode::EmployeeNotFound, payload.employee_id))?;
    ensure_manages(&user, employee.company_id, "employee", employee.id)?;

    if let Some(project_id) = payload.project_id {
        match db::projects::find(&state.pool, project_id).await? {
            Some(p) if p.company_id == employee.company_id => {}
            _ => return Err(missing(ErrorCode::ProjectNotFound, project_id).into()),
        }
    }

    let record = Attendance {
        id: snowflake_id(),
        company_id: employee.company_id,
        employee_id: employee.id,
        project_id: payload.project_id,
        date: payload.date,
        hours: payload.hours,
        note: normalize_optional(payload.note),
        created_at: now_millis(),
    };
    db::attendance::create(&state.pool, &record).await?;
    Ok(Json(record))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    let record = db::attendance::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::AttendanceNotFound, id))?;
    ensure_manages(&user, record.company_id, "attendance", id)?;
    if !db::attendance::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::AttendanceNotFound, id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
