//! Request/response DTOs and JSON mapping helpers.
//!
//! Bodies are explicit typed structures validated at the boundary; handlers
//! never touch unvalidated input.

use serde::Deserialize;
use validator::Validate;

use huddle_core::{Role, User};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordRequest {
    #[serde(rename = "resetToken")]
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub reset_token: String,
    #[serde(rename = "newPassword")]
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Roles creatable through the API. SUPERADMIN and READ_ONLY are not
/// assignable here; the single SUPERADMIN comes from the bootstrap binary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreatableRole {
    Admin,
    User,
}

impl From<CreatableRole> for Role {
    fn from(role: CreatableRole) -> Self {
        match role {
            CreatableRole::Admin => Role::Admin,
            CreatableRole::User => Role::User,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub role: CreatableRole,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, message = "Organization name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Organization domain is required"))]
    pub domain: String,
}

/// Public projection of a user row (never includes credential fields).
pub fn user_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.as_i64(),
        "name": user.name,
        "email": user.email,
        "organization_id": user.organization_id.as_i64(),
        "role": user.role.as_str(),
    })
}

/// Compact projection returned by the login endpoint.
pub fn session_user_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.as_i64(),
        "email": user.email,
        "role": user.role.as_str(),
    })
}
