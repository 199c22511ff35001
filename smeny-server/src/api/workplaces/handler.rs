//! Workplace API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{UserRole, Workplace, WorkplaceCreate, WorkplaceUpdate};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::{ApiResult, check_access, missing};
use crate::auth::{Action, CurrentUser, ResourceKind};
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::normalize_optional;

/// Admin: all; company: own; worker: employer's
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Workplace>> {
    let owner = match user.role() {
        UserRole::Admin => None,
        UserRole::Company => Some(user.id()),
        UserRole::Worker => match user.user.parent_company_id {
            Some(company) => Some(company),
            None => return Ok(Json(Vec::new())),
        },
    };
    Ok(Json(db::workplaces::list(&state.pool, owner).await?))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Workplace> {
    check_access(&state, &user, ResourceKind::Workplace, id, Action::Read).await?;
    let workplace = db::workplaces::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::WorkplaceNotFound, id))?;
    Ok(Json(workplace))
}

/// Companies create for themselves; admins name the owning company
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<WorkplaceCreate>,
) -> ApiResult<Workplace> {
    payload.validate()?;

    let owner_id = if user.is_admin() {
        let owner_id = payload
            .owner_id
            .ok_or_else(|| AppError::validation("owner_id is required"))?;
        db::users::find_company(&state.pool, owner_id)
            .await?
            .ok_or_else(|| missing(ErrorCode::CompanyNotFound, owner_id))?;
        owner_id
    } else {
        user.id()
    };

    let now = now_millis();
    let workplace = Workplace {
        id: snowflake_id(),
        owner_id,
        name: payload.name.trim().to_string(),
        address: normalize_optional(payload.address),
        notes: normalize_optional(payload.notes),
        created_at: now,
        updated_at: now,
    };
    db::workplaces::create(&state.pool, &workplace).await?;
    tracing::info!(workplace_id = workplace.id, owner_id, "Workplace created");
    Ok(Json(workplace))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(mut payload): Json<WorkplaceUpdate>,
) -> ApiResult<Workplace> {
    payload.validate()?;
    // blank strings clear like null
    payload.address = payload.address.map(normalize_optional);
    payload.notes = payload.notes.map(normalize_optional);
    check_access(&state, &user, ResourceKind::Workplace, id, Action::Write).await?;
    let workplace = db::workplaces::update(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::WorkplaceNotFound, id))?;
    Ok(Json(workplace))
}

/// Refused while shifts still reference the workplace
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    check_access(&state, &user, ResourceKind::Workplace, id, Action::Write).await?;
    if db::workplaces::has_shifts(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::WorkplaceHasShifts)
            .with_detail("id", id)
            .into());
    }
    if !db::workplaces::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::WorkplaceNotFound, id).into());
    }
    tracing::info!(workplace_id = id, "Workplace deleted");
    Ok(StatusCode::NO_CONTENT)
}
