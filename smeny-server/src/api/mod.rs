//! HTTP API
//!
//! Each resource module exposes `router()`; handlers live in its
//! `handler.rs`. Everything except health, login and registration sits
//! behind `require_auth`.

pub mod ares;
pub mod audit;
pub mod auth;
pub mod customers;
pub mod documents;
pub mod exchange_requests;
pub mod health;
pub mod invoices;
pub mod reports;
pub mod shifts;
pub mod stats;
pub mod users;
pub mod wf;
pub mod workers;
pub mod workplaces;

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, DefaultBodyLimit, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Json, Router, middleware};
use shared::error::AppError;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{Action, CurrentUser, ResourceKind, authorize, require_auth};
use crate::error::ServiceError;
use crate::middleware::logging_middleware;
use crate::services::storage::MAX_FILE_SIZE;
use crate::state::AppState;
use crate::util::client_ip;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Upload limit plus room for multipart framing and form fields
const MAX_BODY_SIZE: usize = MAX_FILE_SIZE + 64 * 1024;

const REQUEST_ID: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Run the record-level access check for the caller
pub async fn check_access(
    state: &AppState,
    user: &CurrentUser,
    kind: ResourceKind,
    id: i64,
    action: Action,
) -> Result<(), ServiceError> {
    authorize(&state.pool, &user.user, kind, id, action).await
}

/// Caller address for audit records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0);
        Ok(ClientIp(client_ip(
            &parts.headers,
            peer,
            state.config.trust_proxy,
        )))
    }
}

/// Not-found error carrying the id
pub fn missing(code: shared::error::ErrorCode, id: i64) -> AppError {
    AppError::new(code).with_detail("id", id)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(crate::auth::csrf::CSRF_HEADER),
        ])
}

/// Routes without state or middleware
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(audit::router())
        .merge(auth::router())
        .merge(workplaces::router())
        .merge(shifts::router())
        .merge(exchange_requests::router())
        .merge(customers::router())
        .merge(invoices::router())
        .merge(documents::router())
        .merge(workers::router())
        .merge(reports::router())
        .merge(stats::router())
        .merge(ares::router())
        .merge(users::router())
        .nest("/api/wf", wf::router())
}

/// Fully configured application
pub fn build_app(state: AppState) -> Router {
    let protected = build_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_auth,
    ));

    Router::new()
        .merge(health::router())
        .merge(auth::public_router(&state))
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID,
        )))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::Config;
    use sqlx::postgres::PgPoolOptions;

    pub fn config() -> Config {
        Config {
            database_url: "postgres://localhost/smeny_test".into(),
            http_port: 0,
            environment: "development".into(),
            session_secret: "test-secret".into(),
            session_ttl_hours: 24,
            documents_dir: std::env::temp_dir()
                .join("smeny-test-docs")
                .to_string_lossy()
                .into_owned(),
            ares_base_url: "http://127.0.0.1:9".into(),
            log_level: "info".into(),
            log_dir: None,
            cors_origins: vec!["http://localhost:5173".into()],
            trust_proxy: false,
        }
    }

    /// App over a lazy pool that never connects; only routes that fail
    /// before touching the database can be exercised
    pub fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/smeny_test")
            .unwrap();
        build_app(AppState::with_pool(pool, config()).unwrap())
    }
}
