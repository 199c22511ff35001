//! Client Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::ErrorCode;
use shared::models::{Client, ClientCreate, ClientUpdate};
use shared::util::{now_millis, snowflake_id};
use validator::Validate;

use crate::api::wf::{company_context, company_filter, ensure_manages};
use crate::api::{ApiResult, missing};
use crate::auth::CurrentUser;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::normalize_optional;

async fn load(state: &AppState, user: &CurrentUser, id: i64) -> Result<Client, ServiceError> {
    let client = db::clients::find(&state.pool, id)
        .await?
        .ok_or_else(|| missing(ErrorCode::ClientNotFound, id))?;
    ensure_manages(user, client.company_id, "client", id)?;
    Ok(client)
}

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Client>> {
    Ok(Json(
        db::clients::list(&state.pool, company_filter(&user)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Client> {
    Ok(Json(load(&state, &user, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ClientCreate>,
) -> ApiResult<Client> {
    payload.validate()?;
    let company_id = company_context(&user)?;
    let now = now_millis();
    let client = Client {
        id: snowflake_id(),
        company_id,
        name: payload.name.trim().to_string(),
        contact_email: normalize_optional(payload.contact_email),
        contact_phone: normalize_optional(payload.contact_phone),
        notes: normalize_optional(payload.notes),
        created_at: now,
        updated_at: now,
    };
    db::clients::create(&state.pool, &client).await?;
    Ok(Json(client))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ClientUpdate>,
) -> ApiResult<Client> {
    payload.validate()?;
    load(&state, &user, id).await?;
    let client = db::clients::update(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| missing(ErrorCode::ClientNotFound, id))?;
    Ok(Json(client))
}

/// Projects of the client keep their rows with the link cleared
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    load(&state, &user, id).await?;
    if !db::clients::delete(&state.pool, id).await? {
        return Err(missing(ErrorCode::ClientNotFound, id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
