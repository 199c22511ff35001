//! Audit log API (admin only)

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use shared::models::AuditEntry;
use shared::request::{Page, PaginationQuery};

use crate::api::ApiResult;
use crate::auth::require_admin;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/audit-log", get(list))
        .route_layer(middleware::from_fn(require_admin))
}

/// Newest entries first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> ApiResult<Page<AuditEntry>> {
    let limit = query.limit();
    let items = db::audit::query(&state.pool, limit as i64, query.offset() as i64).await?;
    let total = db::audit::count(&state.pool).await?;
    Ok(Json(Page {
        items,
        page: query.page.max(1),
        per_page: limit,
        total,
    }))
}
