//! Bearer-token authentication middleware.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use huddle_auth::verify_token;

use crate::app::errors;
use crate::context::CurrentUser;

/// Cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: Arc<String>,
}

/// Verify the bearer token and attach [`CurrentUser`] to the request.
///
/// A missing token (absent from both carriers) is distinct from an invalid
/// or expired one: 401 versus 403.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(req.headers(), &jar) else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "Authorization token is required",
        );
    };

    let claims = match verify_token(&token, state.jwt_secret.as_bytes()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "token verification failed");
            return errors::json_error(
                StatusCode::FORBIDDEN,
                "invalid_token",
                "Invalid or expired token",
            );
        }
    };

    match CurrentUser::from_claims(&claims) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "token claims unusable");
            errors::json_error(
                StatusCode::FORBIDDEN,
                "invalid_token",
                "Invalid or expired token",
            )
        }
    }
}

/// Token extraction precedence: Authorization header first, `token` cookie
/// second; first present wins.
fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    if let Some(header) = headers.get(axum::http::header::AUTHORIZATION) {
        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(token) = token {
            return Some(token.to_owned());
        }
    }

    jar.get(TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|t| !t.is_empty())
}
