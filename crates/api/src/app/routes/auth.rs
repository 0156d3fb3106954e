//! Authentication routes: login/logout, password reset, Google SSO.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use huddle_auth::issue_token;

use crate::app::{AppServices, dto, errors};
use crate::middleware::TOKEN_COOKIE;
use crate::ratelimit::{self, RateLimitState};

/// Session-cookie lifetime (1 day). Intentionally longer than the embedded
/// token claim: an outlived cookie fails verification and reads as
/// "re-authenticate".
const SESSION_COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;

pub fn router(strict: RateLimitState) -> Router {
    let reset = Router::new()
        .route("/reset-password", post(reset_password))
        .route("/set-password", post(set_password))
        .layer(axum::middleware::from_fn_with_state(
            strict,
            ratelimit::rate_limit_middleware,
        ));

    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/google", get(google_login))
        .route("/google/callback", get(google_callback))
        .merge(reset)
}

fn session_cookie(token: &str, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; \
         Max-Age={SESSION_COOKIE_MAX_AGE_SECS}{secure_flag}"
    )
}

fn clear_session_cookie() -> String {
    format!("{TOKEN_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::validation_failure(e);
    }

    let user = match services.identity.authenticate(&body.email, &body.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password.",
            );
        }
        Err(e) => return errors::core_error_response(e),
    };

    let token = match issue_token(&user, services.jwt_secret()) {
        Ok(token) => token,
        Err(e) => return errors::core_error_response(e.into()),
    };

    (
        [(
            header::SET_COOKIE,
            session_cookie(&token, services.config.secure_cookies),
        )],
        Json(json!({
            "success": true,
            "user": dto::session_user_json(&user),
        })),
    )
        .into_response()
}

pub async fn logout() -> axum::response::Response {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true })),
    )
        .into_response()
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ResetPasswordRequest>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::validation_failure(e);
    }

    let pending = match services.identity.request_reset(&body.email, Utc::now()).await {
        Ok(pending) => pending,
        Err(e) => return errors::core_error_response(e),
    };

    let reset_link = format!(
        "{}/reset-password?token={}",
        services.config.frontend_url, pending.plain_token
    );
    let message = format!(
        "You requested a password reset. Click the link to reset your password:\n\n{reset_link}"
    );

    if let Err(e) = services
        .mailer
        .send(&pending.user.email, "Password Reset Request", &message)
        .await
    {
        tracing::error!(error = %e, "reset email delivery failed");
        return errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "email_delivery_failed",
            "Unable to process password reset request.",
        );
    }

    Json(json!({ "message": "Password reset link sent successfully." })).into_response()
}

pub async fn set_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SetPasswordRequest>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::validation_failure(e);
    }

    match services
        .identity
        .complete_reset(&body.reset_token, &body.new_password, Utc::now())
        .await
    {
        Ok(()) => Json(json!({ "message": "Password reset successful." })).into_response(),
        Err(e) => errors::core_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct OauthCallbackQuery {
    pub code: Option<String>,
    #[allow(dead_code)]
    pub state: Option<String>,
}

pub async fn google_login(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match &services.google {
        Some(google) => Redirect::temporary(&google.authorize_url()).into_response(),
        None => errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "oauth_unavailable",
            "Google login is not configured.",
        ),
    }
}

pub async fn google_callback(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<OauthCallbackQuery>,
) -> axum::response::Response {
    let Some(google) = &services.google else {
        return errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "oauth_unavailable",
            "Google login is not configured.",
        );
    };

    let Some(code) = query.code else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Missing authorization code.",
        );
    };

    let access_token = match google.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => return errors::core_error_response(e),
    };

    let profile = match google.fetch_profile(&access_token).await {
        Ok(profile) => profile,
        Err(e) => return errors::core_error_response(e),
    };

    let display_name = profile.name.clone().unwrap_or_else(|| {
        profile
            .email
            .split('@')
            .next()
            .unwrap_or(&profile.email)
            .to_string()
    });

    match services
        .identity
        .provision_oauth_user(&display_name, &profile.email)
        .await
    {
        Ok(user) => Json(json!({
            "message": "Login successful",
            "user": dto::user_json(&user),
        }))
        .into_response(),
        Err(e) => errors::core_error_response(e),
    }
}
