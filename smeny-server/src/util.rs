//! Shared utility functions

use std::net::SocketAddr;

use axum::http::HeaderMap;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::numeric::Numeric;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn check_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must have at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// 32 random bytes, hex encoded
pub fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Constant-time string comparison
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Non-negative amount that `column` stores exactly
pub fn check_amount(field: &str, value: Decimal, column: Numeric) -> Result<(), AppError> {
    if value.is_sign_negative() {
        return Err(
            AppError::validation(format!("{field} must not be negative")).with_detail("field", field)
        );
    }
    if !column.fits(value) {
        return Err(AppError::validation(format!(
            "{field} is too large or has more than {} decimal places",
            column.scale
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Caller address. The first `X-Forwarded-For` entry counts only behind a
/// trusted proxy; otherwise the peer address is used.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy: bool,
) -> Option<String> {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };
    trust_proxy
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Trim and drop empty strings
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_ignores_forwarded_for_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.4, 10.0.0.2".parse().unwrap());
        let peer: SocketAddr = "192.0.2.10:50000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer), false).as_deref(), Some("192.0.2.10"));
        assert_eq!(client_ip(&headers, None, false), None);
        assert_eq!(client_ip(&headers, Some(peer), true).as_deref(), Some("198.51.100.4"));
        assert_eq!(
            client_ip(&HeaderMap::new(), Some(peer), true).as_deref(),
            Some("192.0.2.10")
        );
    }

    #[test]
    fn test_check_amount() {
        use shared::models::numeric::{MONEY, RATE};
        use std::str::FromStr;
        let d = |s: &str| Decimal::from_str(s).unwrap();

        assert!(check_amount("hourly_rate", d("215.50"), RATE).is_ok());
        assert!(check_amount("hourly_rate", Decimal::ZERO, RATE).is_ok());
        let negative = check_amount("hourly_rate", d("-1"), RATE).unwrap_err();
        assert_eq!(negative.code, ErrorCode::ValidationFailed);
        assert!(negative.message.contains("hourly_rate"));
        assert!(check_amount("hourly_rate", d("10000000000"), RATE).is_err());
        assert!(check_amount("amount", d("12.345"), MONEY).is_err());
        assert!(check_amount("amount", d("1000000000000000"), MONEY).is_err());
    }

    #[test]
    fn test_password_strength() {
        assert_eq!(
            check_password_strength("short").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
        assert!(check_password_strength("dostatečně").is_ok());
        // counted in characters, not bytes
        assert!(check_password_strength("žžžžžžž").is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }

    #[test]
    fn test_generate_token() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  x ".into())), Some("x".into()));
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(None), None);
    }
}
