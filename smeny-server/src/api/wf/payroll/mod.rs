//! Workflow payroll runs (manager only)
//!
//! | Path | Method | Action |
//! |------|--------|--------|
//! | / | GET | list runs |
//! | /run | POST | compute a draft run |
//! | /{id} | GET, DELETE | run with lines, discard a draft |
//! | /{id}/finalize | POST | lock a draft |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/run", post(handler::create))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/finalize", post(handler::finalize))
        .route_layer(middleware::from_fn(require_manager))
}
