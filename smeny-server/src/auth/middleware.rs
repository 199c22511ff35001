//! Authentication middleware
//!
//! `require_auth` resolves the session (cookie or bearer token), enforces
//! CSRF for cookie sessions and injects [`CurrentUser`] into the request
//! extensions. `require_manager` and `require_admin` are role gates layered
//! on top of it.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserRole};
use shared::util::now_millis;
use uuid::Uuid;

use super::csrf::{self, CSRF_HEADER, TokenSource};
use super::session::{SESSION_COOKIE, SessionError, cookie_value};
use crate::db;
use crate::error::ServiceError;
use crate::security_log;
use crate::state::AppState;

/// Authenticated caller, available to handlers as an extractor
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_id: Uuid,
    pub csrf_token: String,
    pub source: TokenSource,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == UserRole::Admin
    }

    pub fn is_manager(&self) -> bool {
        self.user.role.is_manager()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::not_authenticated)
    }
}

/// Session token from `Authorization: Bearer` or the session cookie
pub fn extract_token(headers: &HeaderMap) -> Option<(String, TokenSource)> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        return Some((token.trim().to_string(), TokenSource::Bearer));
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|h| cookie_value(h, SESSION_COOKIE))
        .filter(|t| !t.is_empty())
        .map(|t| (t.to_string(), TokenSource::Cookie))
}

/// Require a valid session
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let Some((token, source)) = extract_token(req.headers()) else {
        security_log!(WARN, "auth_missing", uri = %req.uri());
        return Err(AppError::not_authenticated().into());
    };

    let claims = state.sessions.validate(&token).map_err(|e| {
        security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
        match e {
            SessionError::Expired => AppError::session_expired(),
            _ => AppError::invalid_session("Invalid session token"),
        }
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::invalid_session("Invalid session token"))?;
    let session_id = Uuid::parse_str(&claims.sid)
        .map_err(|_| AppError::invalid_session("Invalid session token"))?;

    let session = db::sessions::find(&state.pool, session_id)
        .await?
        .ok_or_else(|| AppError::invalid_session("Session not found"))?;

    if session.revoked || session.user_id != user_id {
        security_log!(WARN, "session_revoked", session_id = %session_id, user_id = user_id);
        return Err(AppError::invalid_session("Session revoked").into());
    }
    if session.expires_at <= now_millis() {
        return Err(AppError::session_expired().into());
    }

    let user = db::users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::invalid_session("User not found"))?;
    if !user.is_active {
        security_log!(WARN, "inactive_account", user_id = user_id);
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    let header_token = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|h| h.to_str().ok());
    if !csrf::check(req.method(), source, header_token, &session.csrf_token) {
        security_log!(
            WARN,
            "csrf_rejected",
            user_id = user_id,
            method = %req.method(),
            uri = %req.uri()
        );
        return Err(AppError::csrf_invalid().into());
    }

    req.extensions_mut().insert(CurrentUser {
        user,
        session_id,
        csrf_token: session.csrf_token,
        source,
    });

    Ok(next.run(req).await)
}

fn current_user(req: &Request) -> Result<&CurrentUser, AppError> {
    req.extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)
}

/// Require a company or admin account
pub async fn require_manager(req: Request, next: Next) -> Result<Response, AppError> {
    let user = current_user(&req)?;
    if !user.is_manager() {
        security_log!(
            WARN,
            "manager_required",
            user_id = user.id(),
            uri = %req.uri()
        );
        return Err(AppError::new(ErrorCode::ManagerRequired));
    }
    Ok(next.run(req).await)
}

/// Require an admin account
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = current_user(&req)?;
    if !user.is_admin() {
        security_log!(
            WARN,
            "admin_required",
            user_id = user.id(),
            uri = %req.uri()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use http::StatusCode;
    use tower::ServiceExt;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, v.parse().unwrap());
        }
        map
    }

    fn caller(role: UserRole) -> CurrentUser {
        CurrentUser {
            user: User {
                id: 7,
                username: "u".into(),
                email: "u@example.cz".into(),
                password_hash: String::new(),
                first_name: "U".into(),
                last_name: "U".into(),
                phone: None,
                role,
                parent_company_id: None,
                company_name: None,
                company_ico: None,
                company_dic: None,
                company_address: None,
                hourly_rate: None,
                is_active: true,
                created_at: 0,
                updated_at: 0,
            },
            session_id: Uuid::new_v4(),
            csrf_token: "t".into(),
            source: TokenSource::Cookie,
        }
    }

    /// Router with a fixed caller injected ahead of the role gate
    fn gated(role: Option<UserRole>, admin_only: bool) -> Router {
        let route = Router::new().route("/", get(|| async { "ok" }));
        let route = if admin_only {
            route.layer(middleware::from_fn(require_admin))
        } else {
            route.layer(middleware::from_fn(require_manager))
        };
        route.layer(middleware::from_fn(move |mut req: Request, next: Next| async move {
            if let Some(role) = role {
                req.extensions_mut().insert(caller(role));
            }
            next.run(req).await
        }))
    }

    async fn status(router: Router) -> StatusCode {
        router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_extract_bearer_token() {
        let h = headers(&[("authorization", "Bearer abc.def")]);
        assert_eq!(
            extract_token(&h),
            Some(("abc.def".to_string(), TokenSource::Bearer))
        );
    }

    #[test]
    fn test_extract_cookie_token() {
        let h = headers(&[("cookie", "lang=cs; smeny_session=tok123")]);
        assert_eq!(
            extract_token(&h),
            Some(("tok123".to_string(), TokenSource::Cookie))
        );
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let h = headers(&[
            ("cookie", "smeny_session=cookie-token"),
            ("authorization", "Bearer bearer-token"),
        ]);
        assert_eq!(extract_token(&h).unwrap().1, TokenSource::Bearer);
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_token(&headers(&[("cookie", "smeny_session=")])), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_manager_gate() {
        assert_eq!(status(gated(Some(UserRole::Company), false)).await, StatusCode::OK);
        assert_eq!(status(gated(Some(UserRole::Admin), false)).await, StatusCode::OK);
        assert_eq!(
            status(gated(Some(UserRole::Worker), false)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(status(gated(None, false)).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_gate() {
        assert_eq!(status(gated(Some(UserRole::Admin), true)).await, StatusCode::OK);
        assert_eq!(
            status(gated(Some(UserRole::Company), true)).await,
            StatusCode::FORBIDDEN
        );
    }
}
