//! Identity services: tenant resolution, provisioning, login, password reset.
//!
//! Generic over the store traits so this layer has no database dependency;
//! the API crate wires in the Postgres stores, tests wire in the in-memory
//! ones.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use huddle_core::{
    CoreError, CoreResult, NewOrganization, NewUser, Organization, OrganizationStore, Role, User,
    UserStore, email_domain,
};

use crate::password;
use crate::reset::{self, RESET_TOKEN_TTL_SECS};

/// Input for password-credentialed provisioning.
#[derive(Debug, Clone)]
pub struct ProvisionUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    /// Tenant domain to bind the user to (normally derived from the email).
    pub domain: String,
}

/// A staged password reset: the plaintext token leaves the process exactly
/// once, through the mailer.
#[derive(Debug, Clone)]
pub struct PendingReset {
    pub user: User,
    pub plain_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates the credential store and tenant directory.
pub struct IdentityService<O, U> {
    orgs: O,
    users: U,
}

impl<O: OrganizationStore, U: UserStore> IdentityService<O, U> {
    pub fn new(orgs: O, users: U) -> Self {
        Self { orgs, users }
    }

    /// Find-or-create the organization for a domain. New organizations are
    /// named after the domain itself; convergence under concurrent first-use
    /// is the store's contract.
    pub async fn resolve_or_create_tenant(&self, domain: &str) -> CoreResult<Organization> {
        self.orgs.find_or_create(domain).await
    }

    /// Explicitly create an organization (`POST /organizations` path).
    pub async fn create_organization(&self, org: NewOrganization) -> CoreResult<Organization> {
        let created = self.orgs.insert(org).await?;
        info!(org_id = %created.id, domain = %created.domain, "organization created");
        Ok(created)
    }

    pub async fn list_organizations(&self) -> CoreResult<Vec<Organization>> {
        self.orgs.list().await
    }

    /// Create a password-credentialed user bound to the resolved tenant.
    ///
    /// Not idempotent: a second call with the same email fails with
    /// `DuplicateIdentity`, whether through the pre-check or a lost race on
    /// the unique index.
    pub async fn provision_user(&self, input: ProvisionUser) -> CoreResult<User> {
        let organization = self.resolve_or_create_tenant(&input.domain).await?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(CoreError::duplicate("User with this email already exists."));
        }

        let password_hash = password::hash_password(&input.password)?;

        let user = self
            .users
            .insert(NewUser {
                name: input.name,
                email: input.email,
                password_hash: Some(password_hash),
                organization_id: organization.id,
                role: input.role,
            })
            .await?;

        info!(user_id = %user.id, org_id = %organization.id, role = %user.role, "user provisioned");
        Ok(user)
    }

    /// Find-or-create a user from an OAuth profile (no password credential,
    /// role USER). The callback repeats on every login, so an existing row
    /// is fetched rather than treated as a conflict.
    pub async fn provision_oauth_user(&self, name: &str, email: &str) -> CoreResult<User> {
        let domain = email_domain(email)?.to_owned();
        let organization = self.resolve_or_create_tenant(&domain).await?;

        if let Some(existing) = self.users.find_by_email(email).await? {
            return Ok(existing);
        }

        let inserted = self
            .users
            .insert(NewUser {
                name: name.to_owned(),
                email: email.to_owned(),
                password_hash: None,
                organization_id: organization.id,
                role: Role::User,
            })
            .await;

        match inserted {
            Ok(user) => {
                info!(user_id = %user.id, org_id = %organization.id, "oauth user provisioned");
                Ok(user)
            }
            // Lost a race with a concurrent first login; the row exists now.
            Err(CoreError::DuplicateIdentity(_)) => {
                self.users.find_by_email(email).await?.ok_or_else(|| {
                    CoreError::persistence("user vanished after duplicate-insert race")
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Verify a login credential pair.
    ///
    /// Absent user and wrong password both yield `Ok(None)` — the caller
    /// cannot distinguish which case failed. OAuth-only accounts (no stored
    /// hash) never match.
    pub async fn authenticate(&self, email: &str, raw_password: &str) -> CoreResult<Option<User>> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };
        let Some(hash) = user.password_hash.as_deref() else {
            return Ok(None);
        };

        if password::verify_password(raw_password, hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Stage a password reset: store the hashed token with a one-hour expiry
    /// and hand the plaintext back for out-of-band delivery.
    pub async fn request_reset(&self, email: &str, now: DateTime<Utc>) -> CoreResult<PendingReset> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found."))?;

        let token = reset::generate_reset_token();
        let expires_at = now + Duration::seconds(RESET_TOKEN_TTL_SECS);

        self.users
            .set_reset_token(user.id, &token.hashed, expires_at)
            .await?;

        info!(user_id = %user.id, "password reset requested");
        Ok(PendingReset {
            user,
            plain_token: token.plain,
            expires_at,
        })
    }

    /// Consume a reset token: replace the password and clear both token
    /// fields in a single update, making the token single-use.
    pub async fn complete_reset(
        &self,
        plain_token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        let token_hash = reset::hash_reset_token(plain_token);
        let new_password_hash = password::hash_password(new_password)?;

        match self
            .users
            .consume_reset_token(&token_hash, &new_password_hash, now)
            .await?
        {
            Some(user_id) => {
                info!(user_id = %user_id, "password reset completed");
                Ok(())
            }
            None => Err(CoreError::InvalidResetToken),
        }
    }

    /// One-shot bootstrap check; not a standing invariant.
    pub async fn superadmin_exists(&self) -> CoreResult<bool> {
        Ok(self.users.find_superadmin().await?.is_some())
    }
}
