//! Worker API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserRole, WorkerCreate, WorkerUpdate, numeric::RATE};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::{ApiResult, ClientIp, missing};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{check_amount, check_password_strength, hash_password, normalize_optional};

/// Company filter for worker lookups; admins see every worker
fn company_filter(user: &CurrentUser) -> Option<i64> {
    (user.role() == UserRole::Company).then(|| user.id())
}

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<User, ServiceError> {
    Ok(db::users::find_worker(&state.pool, id, company_filter(user))
        .await?
        .ok_or_else(|| missing(ErrorCode::WorkerNotFound, id))?)
}

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<User>> {
    Ok(Json(
        db::users::list_workers(&state.pool, company_filter(&user)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<User> {
    Ok(Json(load(&state, &user, id).await?))
}

/// New worker account employed by the calling company
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    Json(payload): Json<WorkerCreate>,
) -> ApiResult<User> {
    payload.validate()?;
    if user.role() != UserRole::Company {
        return Err(AppError::invalid_request("Workers are created by their company").into());
    }
    check_password_strength(&payload.password)?;
    if let Some(rate) = payload.hourly_rate {
        check_amount("hourly_rate", rate, RATE)?;
    }

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    if db::users::username_taken(&state.pool, &username).await? {
        return Err(AppError::new(ErrorCode::UsernameExists).into());
    }
    if db::users::email_taken(&state.pool, &email, None).await? {
        return Err(AppError::new(ErrorCode::EmailExists).into());
    }

    let password_hash =
        hash_password(&payload.password).map_err(|e| AppError::internal(e.to_string()))?;
    let now = now_millis();
    let worker = User {
        id: snowflake_id(),
        username,
        email,
        password_hash,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        phone: normalize_optional(payload.phone),
        role: UserRole::Worker,
        parent_company_id: Some(user.id()),
        company_name: None,
        company_ico: None,
        company_dic: None,
        company_address: None,
        hourly_rate: payload.hourly_rate,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db::users::create(&state.pool, &worker).await?;

    db::audit::record(
        &state.pool,
        Some(user.id()),
        "worker.create",
        Some(json!({ "worker_id": worker.id, "username": &worker.username })),
        ip.as_deref(),
    )
    .await;
    Ok(Json(worker))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<WorkerUpdate>,
) -> ApiResult<User> {
    payload.validate()?;
    if let Some(rate) = payload.hourly_rate {
        check_amount("hourly_rate", rate, RATE)?;
    }
    load(&state, &user, id).await?;
    let worker = db::users::update_worker(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::WorkerNotFound, id))?;
    Ok(Json(worker))
}

/// Deactivates a worker with shift history, deletes one without
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    load(&state, &user, id).await?;

    let action = if db::users::has_shifts(&state.pool, id).await? {
        db::users::deactivate(&state.pool, id, now_millis()).await?;
        "worker.deactivate"
    } else if db::users::delete(&state.pool, id).await? {
        "worker.delete"
    } else {
        return Err(missing(ErrorCode::WorkerNotFound, id).into());
    };

    db::audit::record(
        &state.pool,
        Some(user.id()),
        action,
        Some(json!({ "worker_id": id })),
        ip.as_deref(),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
