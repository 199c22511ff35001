//! Workflow clients (manager only)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route_layer(middleware::from_fn(require_manager))
}
