//! User provisioning routes (authenticated).

use std::sync::Arc;

use axum::{
    Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::post,
};
use serde_json::json;
use validator::Validate;

use huddle_auth::{ProvisionUser, policy};
use huddle_core::{Role, email_domain};

use crate::app::{AppServices, dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new().route("/", post(create_user))
}

/// POST /v1/users — gated by the role/domain policy; the target's tenant is
/// derived from the new user's email domain.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<CurrentUser>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::validation_failure(e);
    }

    let target_role: Role = body.role.into();
    let target_domain = match email_domain(&body.email) {
        Ok(domain) => domain.to_owned(),
        Err(e) => return errors::core_error_response(e),
    };

    if let Err(denial) =
        policy::can_create_user(actor.role(), actor.domain(), target_role, &target_domain)
    {
        tracing::warn!(
            actor_id = %actor.user_id(),
            target_email = %body.email,
            target_role = %target_role,
            "user creation denied"
        );
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", denial.message());
    }

    match services
        .identity
        .provision_user(ProvisionUser {
            name: body.name,
            email: body.email,
            password: body.password,
            role: target_role,
            domain: target_domain,
        })
        .await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "User created successfully",
                "user": dto::user_json(&user),
            })),
        )
            .into_response(),
        Err(e) => errors::core_error_response(e),
    }
}
