//! Dashboard statistics

use axum::{Json, Router, extract::State, routing::get};
use chrono::Local;
use shared::models::DashboardStats;

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::db::{self, Scope};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/stats", get(dashboard))
}

/// Numbers for the caller's scope, relative to today
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<DashboardStats> {
    let today = Local::now().date_naive();
    let stats = db::stats::dashboard(&state.pool, Scope::of(&user.user), today).await?;
    Ok(Json(stats))
}
