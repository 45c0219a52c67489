//! Admission Middleware
//!
//! - [`enforce_rate_limit`]: per-bucket limit, `X-RateLimit-*` headers on
//!   every response
//! - [`require_csrf`]: origin check, then CSRF token check

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::client_id;
use platform::csrf::CsrfProtector;
use platform::origin::{OriginPolicy, verify_request_origin};
use platform::rate_limit::{RateLimitConfig, RateLimiter};

use crate::application::config::Bucket;
use crate::error::RsvpError;

/// Rate limit state for one bucket
#[derive(Clone)]
pub struct RateLimitGate {
    pub limiter: Arc<dyn RateLimiter>,
    pub bucket: Bucket,
    pub config: RateLimitConfig,
}

/// Origin and CSRF state for mutating routes
#[derive(Clone)]
pub struct CsrfGate {
    pub csrf: Arc<CsrfProtector>,
    pub origin: Arc<OriginPolicy>,
}

pub async fn enforce_rate_limit(
    State(gate): State<RateLimitGate>,
    req: Request,
    next: Next,
) -> Response {
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client = client_id(req.headers(), direct_ip);

    let result = gate.limiter.check(&client, &gate.config);
    if !result.allowed {
        tracing::warn!(
            client = %client,
            bucket = %gate.bucket,
            retry_after_secs = result.retry_after_secs,
            "Rate limit exceeded"
        );
        return RsvpError::RateLimitExceeded(result).into_response();
    }

    let mut response = next.run(req).await;
    response.headers_mut().extend(result.headers());
    response
}

pub async fn require_csrf(
    State(gate): State<CsrfGate>,
    req: Request,
    next: Next,
) -> Result<Response, RsvpError> {
    if !verify_request_origin(req.headers(), &gate.origin) {
        return Err(RsvpError::OriginRejected);
    }

    gate.csrf.verify_request(req.headers())?;

    Ok(next.run(req).await)
}
