//! Session tokens and the session cookie
//!
//! A session is a row in `sessions` plus a signed JWT that names it. The JWT
//! travels in the `smeny_session` cookie (browser) or in an
//! `Authorization: Bearer` header (API clients). Revocation and expiry are
//! decided by the row; the signature only proves the token was issued here.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::UserRole;
use thiserror::Error;

pub const SESSION_COOKIE: &str = "smeny_session";
const ISSUER: &str = "smeny-server";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id (decimal string)
    pub sub: String,
    /// Session id (`sessions.id`)
    pub sid: String,
    pub role: UserRole,
    pub csrf: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("session token expired")]
    Expired,

    #[error("session token generation failed: {0}")]
    GenerationFailed(String),
}

#[derive(Clone)]
pub struct SessionService {
    ttl_hours: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            ttl_hours,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours)
    }

    /// Session expiry (Unix millis) for a session created now
    pub fn expires_at_millis(&self) -> i64 {
        (Utc::now() + self.ttl()).timestamp_millis()
    }

    pub fn issue(
        &self,
        session_id: &str,
        user_id: i64,
        role: UserRole,
        csrf_token: &str,
    ) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            role,
            csrf: csrf_token.to_string(),
            exp: (now + self.ttl()).timestamp(),
            iat: now.timestamp(),
            iss: ISSUER.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::GenerationFailed(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(data.claims)
    }
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<i64, SessionError> {
        self.sub
            .parse()
            .map_err(|_| SessionError::InvalidToken("malformed subject".into()))
    }
}

/// Read a cookie value from a `Cookie` header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}
