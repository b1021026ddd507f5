//! Request middleware: rate limiting, body size limits, security headers
//! and request logging.

use std::{num::NonZeroU32, sync::Arc, time::Instant};

use anyhow::{anyhow, Result};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

use crate::settings::SecurityConfig;

/// Rate limiter type
pub type AppRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create rate limiter from configuration
pub fn create_rate_limiter(config: &SecurityConfig) -> Result<Arc<AppRateLimiter>> {
    let per_minute = NonZeroU32::new(config.rate_limit_per_minute)
        .ok_or_else(|| anyhow!("rate_limit_per_minute must be greater than zero"))?;
    Ok(Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<AppRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match rate_limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            warn!("Rate limit exceeded for request to {}", request.uri().path());
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}

/// Security headers middleware
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("strict-origin-when-cross-origin"));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'self'; style-src 'self' 'unsafe-inline'; form-action 'self'"),
    );
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
    );

    response
}

/// Create request body size limit layer
pub fn create_body_limit_layer(max_size_kb: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_size_kb * 1024)
}

/// Logs every request with its status and latency; error statuses at warn.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed = started.elapsed();

    if status.is_client_error() || status.is_server_error() {
        warn!("{} {} -> {} in {:?}", method, path, status, elapsed);
    } else {
        info!("{} {} -> {} in {:?}", method, path, status, elapsed);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_rate_limiter() {
        let config = SecurityConfig {
            rate_limit_per_minute: 2,
            ..Default::default()
        };

        let rate_limiter = create_rate_limiter(&config).unwrap();
        assert!(rate_limiter.check().is_ok());
        assert!(rate_limiter.check().is_ok());
        assert!(rate_limiter.check().is_err());
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        let config = SecurityConfig {
            rate_limit_per_minute: 0,
            ..Default::default()
        };
        assert!(create_rate_limiter(&config).is_err());
    }

    #[tokio::test]
    async fn test_security_headers_are_added() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(security_headers_middleware));

        let response = app
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.headers()["X-Frame-Options"], "DENY");
        assert_eq!(response.headers()["X-Content-Type-Options"], "nosniff");
    }

    #[tokio::test]
    async fn test_rate_limited_route_returns_429() {
        let limiter = create_rate_limiter(&SecurityConfig {
            rate_limit_per_minute: 1,
            ..Default::default()
        })
        .unwrap();
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));

        let first = app
            .clone()
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
