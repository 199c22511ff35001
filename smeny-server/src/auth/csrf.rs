//! CSRF protection for cookie sessions
//!
//! Browsers attach the session cookie automatically, so state-changing
//! requests authenticated by the cookie must echo the session's token in
//! `X-CSRF-Token`. Bearer-token requests are exempt.

use http::Method;

use crate::util::constant_time_eq;

pub const CSRF_HEADER: &str = "x-csrf-token";

/// How the request proved its session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    Bearer,
}

pub fn is_unsafe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Whether a request passes the CSRF rule
pub fn check(
    method: &Method,
    source: TokenSource,
    header_token: Option<&str>,
    session_token: &str,
) -> bool {
    if source == TokenSource::Bearer || !is_unsafe_method(method) {
        return true;
    }
    header_token.is_some_and(|t| constant_time_eq(t, session_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_methods_skip_check() {
        for m in [Method::GET, Method::HEAD, Method::OPTIONS] {
            assert!(check(&m, TokenSource::Cookie, None, "tok"));
        }
    }

    #[test]
    fn test_unsafe_cookie_requests_need_matching_header() {
        for m in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(!check(&m, TokenSource::Cookie, None, "tok"));
            assert!(!check(&m, TokenSource::Cookie, Some("other"), "tok"));
            assert!(check(&m, TokenSource::Cookie, Some("tok"), "tok"));
        }
    }

    #[test]
    fn test_bearer_requests_exempt() {
        assert!(check(&Method::DELETE, TokenSource::Bearer, None, "tok"));
    }
}
