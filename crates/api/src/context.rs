//! Request context derived from a verified bearer token.

use huddle_auth::Claims;
use huddle_core::{CoreResult, OrgId, Role, UserId, email_domain};

/// Authenticated principal for a request.
///
/// Built by the auth middleware from verified claims and attached as a
/// request extension; handlers never re-verify the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user_id: UserId,
    email: String,
    organization_id: OrgId,
    role: Role,
    domain: String,
}

impl CurrentUser {
    pub fn from_claims(claims: &Claims) -> CoreResult<Self> {
        let domain = email_domain(&claims.email)?.to_owned();
        Ok(Self {
            user_id: UserId::from_i64(claims.sub),
            email: claims.email.clone(),
            organization_id: OrgId::from_i64(claims.organization_id),
            role: claims.role,
            domain,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn organization_id(&self) -> OrgId {
        self.organization_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Domain of the actor's own email — the scope for ADMIN decisions.
    pub fn domain(&self) -> &str {
        &self.domain
    }
}
