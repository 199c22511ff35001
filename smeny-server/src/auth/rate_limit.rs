//! Application-layer rate limiting for login and registration routes

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::security_log;
use crate::state::AppState;
use crate::util::client_ip;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove entries older than 5 minutes
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(300);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }

        map.retain(|_, route_map| !route_map.is_empty());
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.inner.lock().await.values().map(HashMap::len).sum()
    }
}

/// Client IP for rate limiting; `X-Forwarded-For` counts only when the
/// proxy is trusted
pub fn extract_ip(request: &Request, trust_proxy: bool) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    client_ip(request.headers(), peer, trust_proxy).unwrap_or_else(|| "unknown".to_owned())
}

async fn limit(
    state: &AppState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_ip(&request, state.config.trust_proxy);
    if !state.rate_limiter.check(route, &ip, max_requests, 60).await {
        security_log!(WARN, "rate_limited", route = route, ip = %ip);
        return Err(AppError::too_many_requests().into_response());
    }
    Ok(next.run(request).await)
}

/// Rate limit middleware for login: 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    limit(&state, "login", 5, request, next).await
}

/// Rate limit middleware for registration: 3 requests/minute per IP
pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    limit(&state, "register", 3, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("login", "1.2.3.4", 5, 60).await);
        }
        assert!(!limiter.check("login", "1.2.3.4", 5, 60).await);
    }

    #[tokio::test]
    async fn test_routes_and_ips_are_independent() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("register", "1.2.3.4", 3, 60).await);
        }
        assert!(!limiter.check("register", "1.2.3.4", 3, 60).await);
        assert!(limiter.check("register", "5.6.7.8", 3, 60).await);
        assert!(limiter.check("login", "1.2.3.4", 5, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("login", "ip", 1, 60).await);
        assert!(!limiter.check("login", "ip", 1, 60).await);
        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        assert!(limiter.check("login", "ip", 1, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_stale_entries() {
        let limiter = RateLimiter::new();
        limiter.check("login", "a", 5, 60).await;
        limiter.check("register", "b", 3, 60).await;
        assert_eq!(limiter.tracked().await, 2);
        tokio::time::advance(std::time::Duration::from_secs(301)).await;
        limiter.check("login", "c", 5, 60).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked().await, 1);
    }

    fn from_peer(forwarded_for: &str) -> Request {
        let peer: SocketAddr = "192.0.2.10:50000".parse().unwrap();
        let mut req = Request::builder()
            .header("x-forwarded-for", forwarded_for)
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    #[test]
    fn test_extract_ip_uses_peer_unless_proxy_trusted() {
        let req = from_peer("203.0.113.7, 10.0.0.1");
        assert_eq!(extract_ip(&req, false), "192.0.2.10");
        assert_eq!(extract_ip(&req, true), "203.0.113.7");

        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_ip(&req, false), "unknown");
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_is_still_limited() {
        let limiter = RateLimiter::new();
        let mut allowed = 0;
        for i in 0..20 {
            let req = from_peer(&format!("10.0.0.{i}"));
            if limiter.check("login", &extract_ip(&req, false), 5, 60).await {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 5);
        assert_eq!(limiter.tracked().await, 1);
    }
}
