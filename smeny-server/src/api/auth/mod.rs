//! Auth API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::state::AppState;

/// Public routes, each behind its own rate limiter
pub fn public_router(state: &AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/api/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));

    let register = Router::new()
        .route("/api/register", post(handler::register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    login.merge(register)
}

/// Session routes (require a session)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/logout", post(handler::logout))
        .route("/api/user", get(handler::me).put(handler::update_profile))
        .route("/api/user/password", post(handler::change_password))
}
