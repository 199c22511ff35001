//! Report API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Local;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{MonthlyHours, Report, ReportCreate, ReportUpdate};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::{ApiResult, check_access, missing};
use crate::auth::{Action, CurrentUser, ResourceKind};
use crate::db::reports::{aggregate_hours, month_range};
use crate::db::{self, Scope};
use crate::error::ServiceError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HoursQuery {
    /// `YYYY-MM`, defaults to the current month
    pub month: Option<String>,
}

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Report>> {
    Ok(Json(
        db::reports::list(&state.pool, Scope::of(&user.user)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Report> {
    check_access(&state, &user, ResourceKind::Report, id, Action::Read).await?;
    let report = db::reports::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ReportNotFound, id))?;
    Ok(Json(report))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ReportCreate>,
) -> ApiResult<Report> {
    payload.validate()?;
    if let Some(shift_id) = payload.shift_id {
        check_access(&state, &user, ResourceKind::Shift, shift_id, Action::Read).await?;
    }

    let now = now_millis();
    let report = Report {
        id: snowflake_id(),
        user_id: user.id(),
        shift_id: payload.shift_id,
        date: payload.date,
        title: payload.title.trim().to_string(),
        content: payload.content,
        created_at: now,
        updated_at: now,
    };
    db::reports::create(&state.pool, &report).await?;
    Ok(Json(report))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReportUpdate>,
) -> ApiResult<Report> {
    payload.validate()?;
    check_access(&state, &user, ResourceKind::Report, id, Action::Write).await?;
    if let Some(shift_id) = payload.shift_id {
        check_access(&state, &user, ResourceKind::Shift, shift_id, Action::Read).await?;
    }
    let report = db::reports::update(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::ReportNotFound, id))?;
    Ok(Json(report))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    check_access(&state, &user, ResourceKind::Report, id, Action::Write).await?;
    if !db::reports::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::ReportNotFound, id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Hours and earnings per worker for one month
pub async fn monthly_hours(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<HoursQuery>,
) -> ApiResult<MonthlyHours> {
    let month = query
        .month
        .map(|m| m.trim().to_string())
        .unwrap_or_else(|| Local::now().format("%Y-%m").to_string());
    let (from, to) = month_range(&month).ok_or_else(|| {
        AppError::with_message(ErrorCode::InvalidFormat, "month must be YYYY-MM")
            .with_detail("month", month.clone())
    })?;

    let shifts = db::reports::worked_shifts(&state.pool, Scope::of(&user.user), from, to).await?;
    Ok(Json(aggregate_hours(&month, &shifts)))
}
