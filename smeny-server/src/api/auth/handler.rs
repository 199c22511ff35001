//! Authentication Handlers
//!
//! Registration, login, logout and the caller's own profile.

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest, SessionResponse, User, UserRole,
};
use shared::util::{now_millis, snowflake_id};
use uuid::Uuid;
use validator::Validate;

use crate::api::{ApiResult, ClientIp};
use crate::auth::CurrentUser;
use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::db;
use crate::db::sessions::NewSession;
use crate::error::ServiceError;
use crate::security_log;
use crate::services::ares::{is_valid_ico, normalize_ico};
use crate::state::AppState;
use crate::util::{
    check_password_strength, generate_token, hash_password, normalize_optional, verify_password,
};

/// Delay applied to every failed login
const AUTH_FAILURE_DELAY_MS: u64 = 500;

/// Validate and normalize an optional IČO
fn normalize_company_ico(ico: Option<String>) -> Result<Option<String>, AppError> {
    match normalize_optional(ico) {
        None => Ok(None),
        Some(raw) => {
            let ico = normalize_ico(&raw)
                .map_err(|_| AppError::new(ErrorCode::InvalidIco).with_detail("ico", raw.clone()))?;
            if !is_valid_ico(&ico) {
                return Err(AppError::new(ErrorCode::InvalidIco).with_detail("ico", ico));
            }
            Ok(Some(ico))
        }
    }
}

type SessionReply = ([(HeaderName, String); 1], Json<SessionResponse>);

/// Create the session row, sign its token and build the response
async fn start_session(
    state: &AppState,
    user: User,
    headers: &HeaderMap,
    ip: Option<&str>,
) -> Result<SessionReply, ServiceError> {
    let session_id = Uuid::new_v4();
    let csrf_token = generate_token();
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    db::sessions::create(
        &state.pool,
        &NewSession {
            id: session_id,
            user_id: user.id,
            csrf_token: &csrf_token,
            expires_at: state.sessions.expires_at_millis(),
            user_agent,
            ip_address: ip,
        },
        now_millis(),
    )
    .await?;

    let token = state
        .sessions
        .issue(&session_id.to_string(), user.id, user.role, &csrf_token)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let cookie = session_cookie(
        &token,
        state.sessions.ttl().num_seconds(),
        state.config.is_production(),
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse { user, csrf_token }),
    ))
}

/// Register a company or worker account and log it in
pub async fn register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> Result<SessionReply, ServiceError> {
    req.validate()?;
    check_password_strength(&req.password)?;

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    let parent_company_id = match req.role {
        UserRole::Admin => {
            security_log!(WARN, "admin_self_registration", username = %username);
            return Err(AppError::with_message(
                ErrorCode::InvalidRole,
                "Admin accounts cannot be self-registered",
            )
            .into());
        }
        UserRole::Company => {
            if normalize_optional(req.company_name.clone()).is_none() {
                return Err(AppError::validation("company_name is required").into());
            }
            None
        }
        UserRole::Worker => {
            let company_id = req
                .parent_company_id
                .ok_or_else(|| AppError::validation("parent_company_id is required"))?;
            db::users::find_company(&state.pool, company_id)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::CompanyNotFound).with_detail("id", company_id)
                })?;
            Some(company_id)
        }
    };

    if db::users::username_taken(&state.pool, &username).await? {
        return Err(AppError::new(ErrorCode::UsernameExists).into());
    }
    if db::users::email_taken(&state.pool, &email, None).await? {
        return Err(AppError::new(ErrorCode::EmailExists).into());
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| AppError::internal(e.to_string()))?;

    let is_company = req.role == UserRole::Company;
    let now = now_millis();
    let user = User {
        id: snowflake_id(),
        username,
        email,
        password_hash,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        phone: normalize_optional(req.phone),
        role: req.role,
        parent_company_id,
        company_name: normalize_optional(req.company_name).filter(|_| is_company),
        company_ico: normalize_company_ico(req.company_ico)?.filter(|_| is_company),
        company_dic: normalize_optional(req.company_dic).filter(|_| is_company),
        company_address: normalize_optional(req.company_address).filter(|_| is_company),
        hourly_rate: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db::users::create(&state.pool, &user).await?;

    db::audit::record(
        &state.pool,
        Some(user.id),
        "user.register",
        Some(json!({ "username": &user.username, "role": user.role })),
        ip.as_deref(),
    )
    .await;
    tracing::info!(user_id = user.id, role = user.role.as_db(), "User registered");

    start_session(&state, user, &headers, ip.as_deref()).await
}

/// Log in with username or e-mail
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<SessionReply, ServiceError> {
    let login = req.username.trim();
    let user = db::users::find_by_login(&state.pool, login).await?;

    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        found => {
            let reason = if found.is_some() {
                "invalid_password"
            } else {
                "user_not_found"
            };
            db::audit::record(
                &state.pool,
                found.as_ref().map(|u| u.id),
                "user.login_failed",
                Some(json!({ "login": login, "reason": reason })),
                ip.as_deref(),
            )
            .await;
            security_log!(WARN, "login_failed", login = %login, reason = reason);
            tokio::time::sleep(Duration::from_millis(AUTH_FAILURE_DELAY_MS)).await;
            return Err(AppError::invalid_credentials().into());
        }
    };

    if !user.is_active {
        security_log!(WARN, "login_disabled_account", user_id = user.id);
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    db::audit::record(
        &state.pool,
        Some(user.id),
        "user.login",
        None,
        ip.as_deref(),
    )
    .await;
    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    start_session(&state, user, &headers, ip.as_deref()).await
}

/// Revoke the current session and clear the cookie
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
) -> Result<impl IntoResponse, ServiceError> {
    db::sessions::revoke(&state.pool, user.session_id).await?;
    db::audit::record(
        &state.pool,
        Some(user.id()),
        "user.logout",
        None,
        ip.as_deref(),
    )
    .await;

    Ok((
        StatusCode::NO_CONTENT,
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.config.is_production()),
        )],
    ))
}

/// Current user with the session's CSRF token
pub async fn me(user: CurrentUser) -> ApiResult<SessionResponse> {
    Ok(Json(SessionResponse {
        user: user.user,
        csrf_token: user.csrf_token,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(mut req): Json<ProfileUpdate>,
) -> ApiResult<SessionResponse> {
    req.validate()?;

    if let Some(email) = req.email.as_mut() {
        *email = email.trim().to_lowercase();
        if db::users::email_taken(&state.pool, email, Some(user.id())).await? {
            return Err(AppError::new(ErrorCode::EmailExists).into());
        }
    }
    if user.role() != UserRole::Company {
        req.company_name = None;
        req.company_ico = None;
        req.company_dic = None;
        req.company_address = None;
    } else {
        req.company_ico = normalize_company_ico(req.company_ico)?;
    }

    let updated = db::users::update_profile(&state.pool, user.id(), &req, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(SessionResponse {
        user: updated,
        csrf_token: user.csrf_token,
    }))
}

/// Change password; other sessions of the user are revoked
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ClientIp(ip): ClientIp,
    Json(req): Json<PasswordChange>,
) -> Result<StatusCode, ServiceError> {
    if !verify_password(&req.current_password, &user.user.password_hash) {
        security_log!(WARN, "password_change_mismatch", user_id = user.id());
        return Err(AppError::new(ErrorCode::PasswordMismatch).into());
    }
    check_password_strength(&req.new_password)?;

    let hash = hash_password(&req.new_password).map_err(|e| AppError::internal(e.to_string()))?;
    db::users::update_password(&state.pool, user.id(), &hash, now_millis()).await?;
    let revoked = db::sessions::revoke_others(&state.pool, user.id(), user.session_id).await?;

    db::audit::record(
        &state.pool,
        Some(user.id()),
        "user.password_change",
        Some(json!({ "revoked_sessions": revoked })),
        ip.as_deref(),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
