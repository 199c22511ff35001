//! Notification Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::{Notification, NotificationQuery};

use crate::api::{ApiResult, missing};
use crate::auth::CurrentUser;
use crate::db;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// Newest first; `?unread=true` skips read ones
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    Ok(Json(
        db::notifications::list(&state.pool, user.id(), query.unread.unwrap_or(false)).await?,
    ))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Notification> {
    let notification = db::notifications::mark_read(&state.pool, id, user.id())
        .await?
        .ok_or_else(|| missing(ErrorCode::NotificationNotFound, id))?;
    Ok(Json(notification))
}

pub async fn mark_all_read(State(state): State<AppState>, user: CurrentUser) -> ApiResult<MarkedRead> {
    let updated = db::notifications::mark_all_read(&state.pool, user.id()).await?;
    Ok(Json(MarkedRead { updated }))
}
