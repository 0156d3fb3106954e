//! Organization routes (authenticated).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use validator::Validate;

use huddle_auth::policy;
use huddle_core::NewOrganization;

use crate::app::{AppServices, dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new().route("/", get(list_organizations).post(create_organization))
}

/// GET /v1/organizations — the full tenant directory, SUPERADMIN only.
pub async fn list_organizations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<CurrentUser>,
) -> axum::response::Response {
    if !policy::can_list_organizations(actor.role()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "Forbidden");
    }

    match services.identity.list_organizations().await {
        Ok(organizations) => Json(organizations).into_response(),
        Err(e) => errors::core_error_response(e),
    }
}

/// POST /v1/organizations — SUPERADMIN anywhere, others only under their
/// own email domain.
pub async fn create_organization(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<CurrentUser>,
    Json(body): Json<dto::CreateOrganizationRequest>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::validation_failure(e);
    }

    if !policy::can_create_organization(actor.role(), actor.domain(), &body.domain) {
        tracing::warn!(
            actor_id = %actor.user_id(),
            target_domain = %body.domain,
            "organization creation denied"
        );
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Forbidden: You can only create organizations under your domain.",
        );
    }

    match services
        .identity
        .create_organization(NewOrganization {
            name: body.name,
            domain: body.domain,
        })
        .await
    {
        Ok(org) => (StatusCode::CREATED, Json(org)).into_response(),
        Err(e) => errors::core_error_response(e),
    }
}
