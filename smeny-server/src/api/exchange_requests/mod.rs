//! Shift Exchange Request API Module

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/exchange-requests", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/available-shifts", get(handler::available_shifts))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::decide)
                .delete(handler::delete),
        )
}
