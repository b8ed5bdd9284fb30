//! Rate limiting middleware using a sliding window algorithm.
//!
//! Every client IP gets a separate token budget per tier. Auth endpoints and
//! visitor submissions (contact form, comments) have tighter budgets than
//! the rest of the API.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header::HeaderName, HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::ApiError;
use crate::config::RateLimitConfig;
use crate::AppState;

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitTier {
    /// General API reads and admin writes
    Api,
    /// Login, signup and setup
    Auth,
    /// Contact messages and comments
    Submit,
}

impl RateLimitTier {
    /// Pick the tier for a request from its method and full path
    pub fn for_request(method: &Method, path: &str) -> Self {
        if path.starts_with("/api/auth/") && *method == Method::POST {
            return RateLimitTier::Auth;
        }
        if *method == Method::POST && (path == "/api/contact" || path.ends_with("/comments")) {
            return RateLimitTier::Submit;
        }
        RateLimitTier::Api
    }
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    tokens: u32,
    window_start: Instant,
    last_request: Instant,
}

impl RateLimitEntry {
    fn new(max_tokens: u32) -> Self {
        let now = Instant::now();
        Self {
            tokens: max_tokens,
            window_start: now,
            last_request: now,
        }
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    entries: DashMap<(IpAddr, RateLimitTier), RateLimitEntry>,
    config: RateLimitConfig,
    window_duration: Duration,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            entries: DashMap::new(),
            window_duration: Duration::from_secs(config.window_seconds),
            config,
        }
    }

    /// Consume a token if one is available.
    /// Returns Err(retry_after_seconds) when the budget is exhausted.
    pub fn check_rate_limit(&self, ip: IpAddr, tier: RateLimitTier) -> Result<RateLimitInfo, u64> {
        if !self.config.enabled {
            return Ok(RateLimitInfo {
                remaining: u32::MAX,
                limit: u32::MAX,
                reset_after: 0,
            });
        }

        let max_tokens = self.max_tokens(tier);
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry((ip, tier))
            .or_insert_with(|| RateLimitEntry::new(max_tokens));

        let elapsed = now.duration_since(entry.window_start);
        if elapsed >= self.window_duration {
            entry.tokens = max_tokens;
            entry.window_start = now;
        } else {
            // Sliding window: replenish in proportion to the time since the last request
            let since_last = now.duration_since(entry.last_request);
            let replenish_rate = max_tokens as f64 / self.window_duration.as_secs_f64();
            let replenished = (since_last.as_secs_f64() * replenish_rate) as u32;
            entry.tokens = entry.tokens.saturating_add(replenished).min(max_tokens);
        }

        entry.last_request = now;

        if entry.tokens > 0 {
            entry.tokens -= 1;
            Ok(RateLimitInfo {
                remaining: entry.tokens,
                limit: max_tokens,
                reset_after: self.window_duration.saturating_sub(elapsed).as_secs(),
            })
        } else {
            Err(self.window_duration.saturating_sub(elapsed).as_secs().max(1))
        }
    }

    pub fn max_tokens(&self, tier: RateLimitTier) -> u32 {
        match tier {
            RateLimitTier::Api => self.config.api_requests_per_window,
            RateLimitTier::Auth => self.config.auth_requests_per_window,
            RateLimitTier::Submit => self.config.submit_requests_per_window,
        }
    }

    /// Drop entries idle for more than two windows
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        let expiry = self.window_duration * 2;

        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) < expiry);
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub limit: u32,
    pub reset_after: u64,
}

/// Client IP from proxy headers, then the socket address
fn extract_client_ip(request: &Request<Body>) -> IpAddr {
    let headers = request.headers();

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
    {
        return ip;
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
    {
        return ip;
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = extract_client_ip(&request);
    let tier = RateLimitTier::for_request(request.method(), request.uri().path());

    match state.rate_limiter.check_rate_limit(ip, tier) {
        Ok(info) => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(LIMIT_HEADER, HeaderValue::from(info.limit));
            headers.insert(REMAINING_HEADER, HeaderValue::from(info.remaining));
            headers.insert(RESET_HEADER, HeaderValue::from(info.reset_after));
            response
        }
        Err(retry_after) => {
            tracing::debug!(%ip, ?tier, "Rate limit exceeded");
            let mut response = ApiError::rate_limited(format!(
                "Rate limit exceeded. Try again in {} seconds.",
                retry_after
            ))
            .into_response();
            let headers = response.headers_mut();
            headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(retry_after));
            headers.insert(
                LIMIT_HEADER,
                HeaderValue::from(state.rate_limiter.max_tokens(tier)),
            );
            headers.insert(REMAINING_HEADER, HeaderValue::from(0u32));
            headers.insert(RESET_HEADER, HeaderValue::from(retry_after));
            response
        }
    }
}

pub fn spawn_cleanup_task(rate_limiter: Arc<RateLimiter>, cleanup_interval_secs: u64) {
    tokio::spawn(async move {
        let interval = Duration::from_secs(cleanup_interval_secs);
        loop {
            tokio::time::sleep(interval).await;
            rate_limiter.cleanup_expired();
            tracing::debug!(
                "Rate limiter cleanup complete, {} entries remaining",
                rate_limiter.entry_count()
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            api_requests_per_window: 10,
            auth_requests_per_window: 5,
            submit_requests_per_window: 2,
            window_seconds: 60,
            cleanup_interval: 300,
        }
    }

    #[test]
    fn test_blocks_after_limit() {
        let limiter = RateLimiter::new(test_config());
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        for i in 0..10 {
            assert!(
                limiter.check_rate_limit(ip, RateLimitTier::Api).is_ok(),
                "Request {} should be allowed",
                i
            );
        }
        assert!(limiter.check_rate_limit(ip, RateLimitTier::Api).is_err());
    }

    #[test]
    fn test_separate_budgets_per_ip_and_tier() {
        let limiter = RateLimiter::new(test_config());
        let ip1: IpAddr = "192.168.1.1".parse().unwrap();
        let ip2: IpAddr = "192.168.1.2".parse().unwrap();

        for _ in 0..2 {
            let _ = limiter.check_rate_limit(ip1, RateLimitTier::Submit);
        }
        assert!(limiter.check_rate_limit(ip1, RateLimitTier::Submit).is_err());
        assert!(limiter.check_rate_limit(ip2, RateLimitTier::Submit).is_ok());
        assert!(limiter.check_rate_limit(ip1, RateLimitTier::Api).is_ok());
    }

    #[test]
    fn test_disabled_rate_limiting() {
        let mut config = test_config();
        config.enabled = false;
        let limiter = RateLimiter::new(config);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        for _ in 0..100 {
            assert!(limiter.check_rate_limit(ip, RateLimitTier::Auth).is_ok());
        }
    }

    #[test]
    fn test_cleanup_keeps_recent_entries() {
        let limiter = RateLimiter::new(test_config());
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        let _ = limiter.check_rate_limit(ip, RateLimitTier::Api);
        limiter.cleanup_expired();
        assert_eq!(limiter.entry_count(), 1);
    }

    #[test]
    fn test_tier_for_request() {
        assert_eq!(
            RateLimitTier::for_request(&Method::POST, "/api/auth/login"),
            RateLimitTier::Auth
        );
        assert_eq!(
            RateLimitTier::for_request(&Method::GET, "/api/auth/me"),
            RateLimitTier::Api
        );
        assert_eq!(
            RateLimitTier::for_request(&Method::POST, "/api/contact"),
            RateLimitTier::Submit
        );
        assert_eq!(
            RateLimitTier::for_request(&Method::POST, "/api/blog/posts/hello/comments"),
            RateLimitTier::Submit
        );
        assert_eq!(
            RateLimitTier::for_request(&Method::GET, "/api/blog/posts/hello/comments"),
            RateLimitTier::Api
        );
    }

    #[test]
    fn test_extract_client_ip_prefers_forwarded_header() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request), "203.0.113.7".parse::<IpAddr>().unwrap());

        let bare = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_client_ip(&bare), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
