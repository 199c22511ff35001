//! Workflow approvals: any company member asks, the company decides

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let member_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id));

    let decide_routes = Router::new()
        .route("/{id}", put(handler::decide))
        .route_layer(middleware::from_fn(require_manager));

    member_routes.merge(decide_routes)
}
