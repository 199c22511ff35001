//! Account listing (admin only)

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use shared::models::User;
use shared::request::{Page, PaginationQuery};

use crate::api::ApiResult;
use crate::auth::require_admin;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list))
        .route_layer(middleware::from_fn(require_admin))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> ApiResult<Page<User>> {
    let limit = query.limit();
    let items = db::users::list_page(&state.pool, limit as i64, query.offset() as i64).await?;
    let total = db::users::count(&state.pool).await?;
    Ok(Json(Page {
        items,
        page: query.page.max(1),
        per_page: limit,
        total,
    }))
}
