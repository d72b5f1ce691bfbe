//! Rate limiting middleware for API endpoints
//!
//! Fixed-window limiter backed by the shared Redis store so every instance
//! sees the same counters. Counters are partitioned by rule, client IP,
//! caller identity, and path; an authenticated user behind a shared NAT is
//! throttled by identity, not dragged down by neighbours.
//!
//! The limiter runs outermost, before authentication, so it resolves the
//! caller identity from the bearer token itself rather than relying on the
//! auth middleware having run. An invalid token partitions as anonymous and
//! is rejected later by the auth layer.
//!
//! Availability beats strictness: any store failure or timeout logs and
//! fails open.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::header::{HeaderName, HeaderValue, RETRY_AFTER};
use actix_web::{Error, HttpResponse};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;

use arena_infra::cache::redis_client::{RedisClient, WindowCount};
use arena_infra::InfrastructureError;
use arena_shared::config::rate_limit::RateLimitConfig;
use arena_shared::types::response::{error_codes, ApiResponse};

use super::auth::{extract_bearer_token, TokenVerifier};

/// Response header carrying the window's permit limit
pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
/// Response header carrying the permits left in the window
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
/// Response header carrying seconds until the window resets
pub const HEADER_RESET: &str = "x-ratelimit-reset";

/// Rule name used for the global fallback partition
const GLOBAL_RULE: &str = "global";

/// Fixed-window counter store, object-safe so the limiter does not care
/// which backend holds the counters
#[async_trait]
pub trait WindowCounter: Send + Sync {
    /// Atomically increments the counter for `key`, starting a new window
    /// of `window_secs` on the first hit
    async fn increment_window(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<WindowCount, InfrastructureError>;
}

#[async_trait]
impl WindowCounter for RedisClient {
    async fn increment_window(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<WindowCount, InfrastructureError> {
        RedisClient::increment_window(self, key, window_secs).await
    }
}

/// Rate limiter middleware factory
pub struct RateLimiter {
    store: Arc<dyn WindowCounter>,
    config: Arc<RateLimitConfig>,
    verifier: Arc<dyn TokenVerifier>,
}

impl RateLimiter {
    /// Creates the middleware around a counter store, a rule set, and the
    /// verifier used to resolve the caller identity for partitioning
    pub fn new(
        store: Arc<dyn WindowCounter>,
        config: RateLimitConfig,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            verifier,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service: Rc::new(service),
            store: self.store.clone(),
            config: self.config.clone(),
            verifier: self.verifier.clone(),
        }))
    }
}

/// Rate limiter middleware service
pub struct RateLimiterMiddleware<S> {
    service: Rc<S>,
    store: Arc<dyn WindowCounter>,
    config: Arc<RateLimitConfig>,
    verifier: Arc<dyn TokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let store = self.store.clone();
        let config = self.config.clone();
        let verifier = self.verifier.clone();

        Box::pin(async move {
            if !config.enabled {
                return service.call(req).await;
            }

            let path = req.path().to_string();
            let (rule_name, limit, window_secs) = match config.match_rule(&path) {
                Some(rule) => (rule.name.clone(), rule.limit, rule.window_secs),
                None => (
                    GLOBAL_RULE.to_string(),
                    config.global_limit,
                    config.global_window_secs,
                ),
            };

            let user = resolve_user(&req, verifier.as_ref());
            let key = partition_key(&rule_name, &client_ip(&req), &user, &path);

            let window = match store.increment_window(&key, window_secs).await {
                Ok(window) => window,
                Err(e) => {
                    // Fail open; the headers would be meaningless anyway
                    log::error!("rate limit store unavailable, allowing request: {e}");
                    return service.call(req).await;
                }
            };

            let headers = RateLimitHeaders::from_window(limit, &window);

            if window.count > u64::from(limit) {
                log::warn!(
                    "rate limit exceeded for key {key} ({count}/{limit})",
                    count = window.count
                );
                return Err(too_many_requests(&headers));
            }

            let mut res = service.call(req).await?;
            headers.apply(res.headers_mut());
            Ok(res)
        })
    }
}

/// The three informational headers, attached to every response while the
/// limiter is enabled and its store is reachable
struct RateLimitHeaders {
    limit: u32,
    remaining: u64,
    reset_secs: i64,
}

impl RateLimitHeaders {
    fn from_window(limit: u32, window: &WindowCount) -> Self {
        Self {
            limit,
            remaining: u64::from(limit).saturating_sub(window.count),
            reset_secs: window.ttl_secs.max(0),
        }
    }

    fn apply(&self, headers: &mut actix_web::http::header::HeaderMap) {
        let pairs = [
            (HEADER_LIMIT, self.limit.to_string()),
            (HEADER_REMAINING, self.remaining.to_string()),
            (HEADER_RESET, self.reset_secs.to_string()),
        ];
        for (name, value) in pairs {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                headers.insert(name, value);
            }
        }
    }
}

/// Builds the 429 response with headers and the standard error envelope
fn too_many_requests(headers: &RateLimitHeaders) -> Error {
    let mut builder = HttpResponse::TooManyRequests();
    builder.insert_header((HEADER_LIMIT, headers.limit.to_string()));
    builder.insert_header((HEADER_REMAINING, headers.remaining.to_string()));
    builder.insert_header((HEADER_RESET, headers.reset_secs.to_string()));
    builder.insert_header((RETRY_AFTER, headers.reset_secs.to_string()));

    let response = builder.json(ApiResponse::<()>::error(
        error_codes::RATE_LIMITED,
        "Too many requests, please retry later",
    ));
    InternalError::from_response("rate limit exceeded", response).into()
}

/// Caller identity used in the partition key: the token subject when a
/// valid bearer token accompanies the request, `anon` otherwise
fn resolve_user(req: &ServiceRequest, verifier: &dyn TokenVerifier) -> String {
    extract_bearer_token(req)
        .and_then(|token| verifier.verify(&token).ok())
        .and_then(|claims| claims.user_id().ok())
        .map(|id| id.to_string())
        .unwrap_or_else(|| "anon".to_string())
}

/// Counter partition: rule, client IP, caller identity, path
fn partition_key(rule: &str, ip: &str, user: &str, path: &str) -> String {
    format!("rate_limit:{}:{}:{}:{}", rule, ip, user, path.to_lowercase())
}

/// Client IP, preferring proxy headers over the socket peer
fn client_ip(req: &ServiceRequest) -> String {
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.to_string();
        }
    }

    req.connection_info()
        .peer_addr()
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::header::AUTHORIZATION;
    use uuid::Uuid;

    use arena_core::domain::entities::token::Claims;
    use arena_core::domain::entities::user::UserIdentity;
    use arena_core::errors::TokenError;

    struct StubVerifier {
        claims: Claims,
    }

    impl TokenVerifier for StubVerifier {
        fn verify(&self, token: &str) -> Result<Claims, TokenError> {
            if token == "valid" {
                Ok(self.claims.clone())
            } else {
                Err(TokenError::InvalidToken)
            }
        }
    }

    fn stub_verifier() -> (Uuid, StubVerifier) {
        let user = UserIdentity::new(Uuid::new_v4(), "fan@arena.example", "Fan");
        let claims = Claims::new_access_token(&user, vec![], "iss", "aud", 30);
        (user.id, StubVerifier { claims })
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        use actix_web::test;

        let req = test::TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9, 10.0.0.1"))
            .insert_header(("X-Real-IP", "10.0.0.2"))
            .to_srv_request();
        assert_eq!(client_ip(&req), "203.0.113.9");

        let req = test::TestRequest::default()
            .insert_header(("X-Real-IP", "10.0.0.2"))
            .to_srv_request();
        assert_eq!(client_ip(&req), "10.0.0.2");
    }

    #[test]
    fn test_resolve_user_from_bearer_token() {
        use actix_web::test;

        let (user_id, verifier) = stub_verifier();

        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer valid"))
            .to_srv_request();
        assert_eq!(resolve_user(&req, &verifier), user_id.to_string());

        // Invalid tokens partition as anonymous; auth rejects them later
        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer forged"))
            .to_srv_request();
        assert_eq!(resolve_user(&req, &verifier), "anon");

        let req = test::TestRequest::default().to_srv_request();
        assert_eq!(resolve_user(&req, &verifier), "anon");
    }

    #[test]
    fn test_partition_key_shape() {
        let key = partition_key("refresh", "198.51.100.4", "anon", "/API/v1/Auth/Refresh");
        assert_eq!(
            key,
            "rate_limit:refresh:198.51.100.4:anon:/api/v1/auth/refresh"
        );
    }

    #[test]
    fn test_headers_floor_remaining_at_zero() {
        let window = WindowCount {
            count: 7,
            ttl_secs: 42,
        };
        let headers = RateLimitHeaders::from_window(5, &window);
        assert_eq!(headers.remaining, 0);
        assert_eq!(headers.reset_secs, 42);

        let negative_ttl = WindowCount {
            count: 1,
            ttl_secs: -2,
        };
        let headers = RateLimitHeaders::from_window(5, &negative_ttl);
        assert_eq!(headers.remaining, 4);
        assert_eq!(headers.reset_secs, 0);
    }
}
