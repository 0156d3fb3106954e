//! In-memory stores for tests and local development.
//!
//! Each store serializes behind one mutex, so find-or-create and
//! insert-with-uniqueness behave atomically — the same guarantees the
//! Postgres constraints provide, without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use huddle_core::{
    CoreError, CoreResult, NewOrganization, NewUser, Organization, OrganizationStore, Role, User,
    UserId, UserStore,
};

#[derive(Debug, Default)]
struct OrgTable {
    next_id: i64,
    rows: Vec<Organization>,
}

/// In-memory tenant directory.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationStore {
    inner: Mutex<OrgTable>,
}

impl InMemoryOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationStore for InMemoryOrganizationStore {
    async fn find_by_domain(&self, domain: &str) -> CoreResult<Option<Organization>> {
        let table = self.inner.lock().expect("org table poisoned");
        Ok(table.rows.iter().find(|o| o.domain == domain).cloned())
    }

    async fn find_or_create(&self, domain: &str) -> CoreResult<Organization> {
        let mut table = self.inner.lock().expect("org table poisoned");
        if let Some(existing) = table.rows.iter().find(|o| o.domain == domain) {
            return Ok(existing.clone());
        }

        table.next_id += 1;
        let org = Organization {
            id: table.next_id.into(),
            name: domain.to_owned(),
            domain: domain.to_owned(),
        };
        table.rows.push(org.clone());
        Ok(org)
    }

    async fn insert(&self, org: NewOrganization) -> CoreResult<Organization> {
        let mut table = self.inner.lock().expect("org table poisoned");
        if table.rows.iter().any(|o| o.domain == org.domain) {
            return Err(CoreError::duplicate(
                "Organization with this domain already exists.",
            ));
        }

        table.next_id += 1;
        let org = Organization {
            id: table.next_id.into(),
            name: org.name,
            domain: org.domain,
        };
        table.rows.push(org.clone());
        Ok(org)
    }

    async fn list(&self) -> CoreResult<Vec<Organization>> {
        let table = self.inner.lock().expect("org table poisoned");
        Ok(table.rows.clone())
    }
}

#[derive(Debug, Default)]
struct UserTable {
    next_id: i64,
    rows: Vec<User>,
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: Mutex<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let table = self.inner.lock().expect("user table poisoned");
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> CoreResult<User> {
        let mut table = self.inner.lock().expect("user table poisoned");
        if table.rows.iter().any(|u| u.email == user.email) {
            return Err(CoreError::duplicate("User with this email already exists."));
        }

        table.next_id += 1;
        let user = User {
            id: table.next_id.into(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            organization_id: user.organization_id,
            role: user.role,
            reset_token: None,
            reset_token_expires: None,
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        let mut table = self.inner.lock().expect("user table poisoned");
        if let Some(user) = table.rows.iter_mut().find(|u| u.id == id) {
            user.reset_token = Some(token_hash.to_owned());
            user.reset_token_expires = Some(expires_at);
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<UserId>> {
        let mut table = self.inner.lock().expect("user table poisoned");
        let matched = table.rows.iter_mut().find(|u| {
            u.reset_token.as_deref() == Some(token_hash)
                && u.reset_token_expires.is_some_and(|exp| exp > now)
        });

        Ok(matched.map(|user| {
            user.password_hash = Some(new_password_hash.to_owned());
            user.reset_token = None;
            user.reset_token_expires = None;
            user.id
        }))
    }

    async fn find_superadmin(&self) -> CoreResult<Option<User>> {
        let table = self.inner.lock().expect("user table poisoned");
        Ok(table
            .rows
            .iter()
            .find(|u| u.role == Role::Superadmin)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn find_or_create_converges_under_concurrency() {
        let store = Arc::new(InMemoryOrganizationStore::new());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.find_or_create("new.example").await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let orgs = store.list().await.unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].domain, "new.example");
    }

    #[tokio::test]
    async fn duplicate_email_insert_is_rejected() {
        let store = InMemoryUserStore::new();
        let new_user = || NewUser {
            name: "Alice".into(),
            email: "alice@acme.com".into(),
            password_hash: None,
            organization_id: 1.into(),
            role: Role::User,
        };

        store.insert(new_user()).await.unwrap();
        assert!(matches!(
            store.insert(new_user()).await,
            Err(CoreError::DuplicateIdentity(_))
        ));
    }
}
