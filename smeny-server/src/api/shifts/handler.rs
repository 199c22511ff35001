//! Shift API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Shift, ShiftCreate, ShiftDetail, ShiftQuery, ShiftUpdate, Workplace};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::{ApiResult, check_access, missing};
use crate::auth::{Action, CurrentUser, ResourceKind};
use crate::db::{self, Scope};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::normalize_optional;

/// Workplace the caller may schedule at
async fn writable_workplace(
    state: &AppState,
    user: &CurrentUser,
    workplace_id: i64,
) -> Result<Workplace, ServiceError> {
    check_access(state, user, ResourceKind::Workplace, workplace_id, Action::Write).await?;
    let workplace = db::workplaces::find(&state.pool, workplace_id)
        .await?
        .ok_or_else(|| missing(ErrorCode::WorkplaceNotFound, workplace_id))?;
    Ok(workplace)
}

/// Assignees must be active workers of the company owning the workplace
async fn check_assignee(
    state: &AppState,
    workplace: &Workplace,
    worker_id: i64,
) -> Result<(), ServiceError> {
    let worker = db::users::find_worker(&state.pool, worker_id, Some(workplace.owner_id)).await?;
    match worker {
        Some(w) if w.is_active => Ok(()),
        _ => Err(AppError::new(ErrorCode::WorkerNotFound)
            .with_detail("id", worker_id)
            .into()),
    }
}

/// Workers see their own shifts only
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ShiftQuery>,
) -> ApiResult<Vec<ShiftDetail>> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidShiftTime,
            "`from` must not be after `to`",
        )
        .into());
    }
    let shifts = db::shifts::list(&state.pool, Scope::of(&user.user), &query).await?;
    Ok(Json(shifts))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<ShiftDetail> {
    check_access(&state, &user, ResourceKind::Shift, id, Action::Read).await?;
    let shift = db::shifts::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ShiftNotFound, id))?;
    Ok(Json(shift))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ShiftCreate>,
) -> ApiResult<Shift> {
    payload.validate()?;
    let workplace = writable_workplace(&state, &user, payload.workplace_id).await?;
    if let Some(worker_id) = payload.user_id {
        check_assignee(&state, &workplace, worker_id).await?;
    }

    let now = now_millis();
    let shift = Shift {
        id: snowflake_id(),
        workplace_id: workplace.id,
        user_id: payload.user_id,
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        notes: normalize_optional(payload.notes),
        created_at: now,
        updated_at: now,
    };
    db::shifts::create(&state.pool, &shift).await?;
    tracing::info!(shift_id = shift.id, workplace_id = shift.workplace_id, "Shift created");
    Ok(Json(shift))
}

/// Merge the update into the stored shift; `user_id: null` unassigns
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ShiftUpdate>,
) -> ApiResult<Shift> {
    payload.validate()?;
    check_access(&state, &user, ResourceKind::Shift, id, Action::Write).await?;
    let mut shift = db::shifts::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ShiftNotFound, id))?;

    let workplace_id = payload.workplace_id.unwrap_or(shift.workplace_id);
    let assignee = payload.user_id.unwrap_or(shift.user_id);
    let workplace_changed = workplace_id != shift.workplace_id;
    let assignee_changed = assignee != shift.user_id;

    if workplace_changed || assignee_changed {
        let workplace = writable_workplace(&state, &user, workplace_id).await?;
        if let Some(worker_id) = assignee {
            check_assignee(&state, &workplace, worker_id).await?;
        }
    }

    shift.workplace_id = workplace_id;
    shift.user_id = assignee;
    if let Some(date) = payload.date {
        shift.date = date;
    }
    if let Some(start) = payload.start_time {
        shift.start_time = start;
    }
    if let Some(end) = payload.end_time {
        shift.end_time = end;
    }
    if payload.notes.is_some() {
        shift.notes = normalize_optional(payload.notes);
    }
    shift.updated_at = now_millis();

    if !db::shifts::save(&state.pool, &shift).await? {
        return Err(missing(ErrorCode::ShiftNotFound, id).into());
    }
    Ok(Json(shift))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    check_access(&state, &user, ResourceKind::Shift, id, Action::Write).await?;
    if !db::shifts::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::ShiftNotFound, id).into());
    }
    tracing::info!(shift_id = id, "Shift deleted");
    Ok(StatusCode::NO_CONTENT)
}
