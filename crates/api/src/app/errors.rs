//! Consistent JSON error responses.
//!
//! The core taxonomy is mapped to HTTP statuses exactly once, here. Clients
//! get a stable machine-readable code plus a message; internals are logged,
//! never exposed.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use huddle_core::CoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a core failure to its HTTP response.
pub fn core_error_response(err: CoreError) -> axum::response::Response {
    match err {
        CoreError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        CoreError::Authentication(msg) => {
            json_error(StatusCode::UNAUTHORIZED, "authentication_failed", msg)
        }
        CoreError::Authorization(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        CoreError::DuplicateIdentity(msg) => {
            json_error(StatusCode::CONFLICT, "duplicate_identity", msg)
        }
        CoreError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        CoreError::InvalidResetToken => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_or_expired_token",
            "Invalid or expired token.",
        ),
        CoreError::RateLimited => json_error(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "Too many requests from this IP, try again later.",
        ),
        CoreError::Persistence(msg) => {
            tracing::error!(error = %msg, "persistence failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "persistence_error",
                "An internal error occurred.",
            )
        }
        CoreError::UpstreamTimeout(msg) => {
            tracing::error!(error = %msg, "upstream timeout");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_timeout",
                "The service is temporarily unavailable; please retry.",
            )
        }
    }
}

/// Map request-body validation failures to a 400 with field details.
pub fn validation_failure(errors: validator::ValidationErrors) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation_error",
            "message": errors.to_string(),
        })),
    )
        .into_response()
}
