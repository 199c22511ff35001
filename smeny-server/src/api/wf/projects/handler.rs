//! Project Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Project, ProjectCreate, ProjectQuery, ProjectUpdate, numeric::MONEY};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::wf::{company_context, company_filter, ensure_manages};
use crate::api::{ApiResult, missing};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{check_amount, normalize_optional};

fn check_budget(budget: Option<Decimal>) -> Result<(), AppError> {
    match budget {
        Some(b) => check_amount("budget", b, MONEY),
        None => Ok(()),
    }
}

/// A referenced client must belong to the project's company
async fn check_client(
    state: &AppState,
    client_id: Option<i64>,
    company_id: i64,
) -> Result<(), ServiceError> {
    let Some(client_id) = client_id else {
        return Ok(());
    };
    match db::clients::find(&state.pool, client_id).await? {
        Some(c) if c.company_id == company_id => Ok(()),
        _ => Err(missing(ErrorCode::ClientNotFound, client_id).into()),
    }
}

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<Project, ServiceError> {
    let project = db::projects::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ProjectNotFound, id))?;
    ensure_manages(user, project.company_id, "project", id)?;
    Ok(project)
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Vec<Project>> {
    Ok(Json(
        db::projects::list(&state.pool, company_filter(&user), &query).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Project> {
    Ok(Json(load(&state, &user, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ProjectCreate>,
) -> ApiResult<Project> {
    payload.validate()?;
    check_budget(payload.budget)?;
    let company_id = company_context(&user)?;
    check_client(&state, payload.client_id, company_id).await?;

    let now = now_millis();
    let project = Project {
        id: snowflake_id(),
        company_id,
        client_id: payload.client_id,
        name: payload.name.trim().to_string(),
        description: normalize_optional(payload.description),
        status: payload.status.unwrap_or_default(),
        budget: payload.budget,
        created_at: now,
        updated_at: now,
    };
    db::projects::create(&state.pool, &project).await?;
    Ok(Json(project))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectUpdate>,
) -> ApiResult<Project> {
    payload.validate()?;
    check_budget(payload.budget)?;
    let existing = load(&state, &user, id).await?;
    check_client(&state, payload.client_id, existing.company_id).await?;

    let project = db::projects::update(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::ProjectNotFound, id))?;
    Ok(Json(project))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    load(&state, &user, id).await?;
    if !db::projects::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::ProjectNotFound, id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_budget() {
        assert!(check_budget(None).is_ok());
        assert!(check_budget(Some(Decimal::from(50_000))).is_ok());
        assert!(check_budget(Some(Decimal::from(-1))).is_err());
        assert!(check_budget(Some(Decimal::new(1_999, 3))).is_err());
        assert!(check_budget(Some(Decimal::from(1_000_000_000_000i64))).is_err());
    }
}
