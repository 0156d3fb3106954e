//! Store traits implemented by the persistence layer.
//!
//! Services are generic over these traits so the auth layer carries no
//! database dependency; the infra crate provides the Postgres and in-memory
//! implementations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::id::UserId;
use crate::model::{NewOrganization, NewUser, Organization, User};

/// Persistence operations on the tenant directory.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find_by_domain(&self, domain: &str) -> CoreResult<Option<Organization>>;

    /// Atomic find-or-create keyed on the unique domain.
    ///
    /// Concurrent first-uses of a domain must converge on a single row;
    /// implementations back this with the unique constraint, never with a
    /// bare check-then-insert.
    async fn find_or_create(&self, domain: &str) -> CoreResult<Organization>;

    /// Explicit creation (`POST /organizations`). Fails with
    /// `DuplicateIdentity` when the domain is already taken.
    async fn insert(&self, org: NewOrganization) -> CoreResult<Organization>;

    async fn list(&self) -> CoreResult<Vec<Organization>>;
}

/// Persistence operations on the credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    /// Insert a user row. The unique email index is the serialization point:
    /// a lost race surfaces as `DuplicateIdentity`, never a generic failure.
    async fn insert(&self, user: NewUser) -> CoreResult<User>;

    /// Stage a pending password reset (hashed token + expiry).
    async fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()>;

    /// Consume a pending reset in one update: match on the stored token hash
    /// with a still-future expiry, replace the password hash, and clear both
    /// token fields. Returns the affected user id, or `None` when no row
    /// matched (unknown, already consumed, or expired token).
    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<UserId>>;

    /// Whether any SUPERADMIN exists (bootstrap one-shot check only; this is
    /// not a standing invariant).
    async fn find_superadmin(&self) -> CoreResult<Option<User>>;
}

#[async_trait]
impl<S> OrganizationStore for Arc<S>
where
    S: OrganizationStore + ?Sized,
{
    async fn find_by_domain(&self, domain: &str) -> CoreResult<Option<Organization>> {
        (**self).find_by_domain(domain).await
    }

    async fn find_or_create(&self, domain: &str) -> CoreResult<Organization> {
        (**self).find_or_create(domain).await
    }

    async fn insert(&self, org: NewOrganization) -> CoreResult<Organization> {
        (**self).insert(org).await
    }

    async fn list(&self) -> CoreResult<Vec<Organization>> {
        (**self).list().await
    }
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        (**self).find_by_email(email).await
    }

    async fn insert(&self, user: NewUser) -> CoreResult<User> {
        (**self).insert(user).await
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        (**self).set_reset_token(id, token_hash, expires_at).await
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<UserId>> {
        (**self)
            .consume_reset_token(token_hash, new_password_hash, now)
            .await
    }

    async fn find_superadmin(&self) -> CoreResult<Option<User>> {
        (**self).find_superadmin().await
    }
}
