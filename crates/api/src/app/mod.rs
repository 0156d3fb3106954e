//! HTTP application wiring (Axum router + middleware stack).
//!
//! Layout:
//! - `services.rs`: injected resource handles (stores, mailer, OAuth client)
//! - `routes/`: HTTP routes + handlers (one file per surface area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `oauth.rs`: Google authorization-code client

use std::sync::Arc;

use axum::http::{HeaderValue, header};
use axum::{Extension, Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use huddle_infra::RateLimitStore;

use crate::middleware::{self, AuthState};
use crate::ratelimit::{self, RateLimitState};

pub mod dto;
pub mod errors;
pub mod oauth;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full router (used by `main.rs` and the test harness).
///
/// `/health` and `/ping` stay outside both the auth and rate-limit stacks;
/// everything under `/v1` is rate limited, and the organization/user
/// surfaces additionally require a verified bearer token.
pub fn build_app(services: Arc<AppServices>, limiter: Arc<dyn RateLimitStore>) -> Router {
    build_app_with_limits(
        services,
        RateLimitState::general(Arc::clone(&limiter)),
        RateLimitState::strict(limiter),
    )
}

/// Router construction with explicit limiter scopes (tests tighten them).
pub fn build_app_with_limits(
    services: Arc<AppServices>,
    general: RateLimitState,
    strict: RateLimitState,
) -> Router {
    let auth_state = AuthState {
        jwt_secret: Arc::new(services.config.jwt_secret.clone()),
    };

    let protected = Router::new()
        .nest("/v1/organizations", routes::organizations::router())
        .nest("/v1/users", routes::users::router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    let v1 = Router::new()
        .nest("/v1/auth", routes::auth::router(strict))
        .merge(protected)
        .layer(axum::middleware::from_fn_with_state(
            general,
            ratelimit::rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/ping", get(routes::system::ping))
        .merge(v1)
        .layer(Extension(services))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}
