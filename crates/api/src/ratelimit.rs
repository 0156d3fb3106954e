//! Per-client-IP rate-limit middleware.
//!
//! Requests over the window are rejected before any core logic runs. The
//! counter store is shared (Redis) so limits hold across server instances.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use huddle_infra::RateLimitStore;

use crate::app::errors;

const WINDOW: Duration = Duration::from_secs(15 * 60);

/// One limiter scope: a named counter family with its own quota.
#[derive(Clone)]
pub struct RateLimitState {
    store: Arc<dyn RateLimitStore>,
    scope: &'static str,
    max_requests: u64,
    message: &'static str,
}

impl RateLimitState {
    /// General API quota (all /v1 routes).
    pub fn general(store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            scope: "api",
            max_requests: 100,
            message: "Too many requests from this IP, try again later.",
        }
    }

    /// Stricter quota for the credential-recovery endpoints.
    pub fn strict(store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            scope: "login",
            max_requests: 10,
            message: "Too many login attempts, try again later.",
        }
    }

    /// Custom quota under the general message (used by tests and tooling).
    pub fn with_quota(store: Arc<dyn RateLimitStore>, scope: &'static str, max: u64) -> Self {
        Self {
            store,
            scope,
            max_requests: max,
            message: "Too many requests from this IP, try again later.",
        }
    }
}

pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    let key = format!("ratelimit:{}:{}", state.scope, ip);

    match state.store.record_hit(&key, WINDOW).await {
        Ok(count) if count > state.max_requests => {
            tracing::warn!(%ip, scope = state.scope, count, "rate limit exceeded");
            errors::json_error(StatusCode::TOO_MANY_REQUESTS, "rate_limited", state.message)
        }
        Ok(_) => next.run(req).await,
        Err(e) => {
            tracing::error!(error = %e, "rate-limit store unavailable");
            errors::core_error_response(e)
        }
    }
}

fn client_ip(req: &axum::http::Request<axum::body::Body>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
