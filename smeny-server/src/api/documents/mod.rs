//! Document API Module

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/documents", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::upload))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/download", get(handler::download))
}
