//! Postgres-backed stores.
//!
//! Every query is bounded by a statement timeout; on elapse the caller sees
//! a retryable `UpstreamTimeout` instead of a hung request. Unique-index
//! violations surface as `DuplicateIdentity` so a lost insert race reads the
//! same as the pre-check.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use huddle_core::{
    CoreError, CoreResult, NewOrganization, NewUser, Organization, OrganizationStore, Role, User,
    UserId, UserStore,
};

const STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

const USER_COLUMNS: &str =
    "id, name, email, password, organization_id, role, reset_token, reset_token_expires";

/// Run a store call under the statement timeout, folding driver errors into
/// the core taxonomy.
async fn bounded<T, F>(op: &'static str, fut: F) -> CoreResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(STATEMENT_TIMEOUT, fut).await {
        Err(_) => Err(CoreError::timeout(op)),
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(map_db_error(op, e)),
    }
}

fn map_db_error(op: &'static str, e: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &e {
        // 23505 = unique_violation
        if db.code().as_deref() == Some("23505") {
            let message = match db.constraint() {
                Some("users_email_key") => "User with this email already exists.",
                Some("organizations_domain_key") => {
                    "Organization with this domain already exists."
                }
                _ => "duplicate value",
            };
            return CoreError::duplicate(message);
        }
    }
    CoreError::persistence(format!("{op}: {e}"))
}

fn org_from_row(row: &PgRow) -> CoreResult<Organization> {
    Ok(Organization {
        id: row
            .try_get::<i64, _>("id")
            .map_err(|e| CoreError::persistence(format!("organizations.id: {e}")))?
            .into(),
        name: row
            .try_get("name")
            .map_err(|e| CoreError::persistence(format!("organizations.name: {e}")))?,
        domain: row
            .try_get("domain")
            .map_err(|e| CoreError::persistence(format!("organizations.domain: {e}")))?,
    })
}

fn user_from_row(row: &PgRow) -> CoreResult<User> {
    let col = |name: &'static str, e: sqlx::Error| {
        CoreError::persistence(format!("users.{name}: {e}"))
    };

    let id: i64 = row.try_get("id").map_err(|e| col("id", e))?;
    let organization_id: Option<i64> = row
        .try_get("organization_id")
        .map_err(|e| col("organization_id", e))?;
    let role: String = row.try_get("role").map_err(|e| col("role", e))?;

    Ok(User {
        id: id.into(),
        name: row.try_get("name").map_err(|e| col("name", e))?,
        email: row.try_get("email").map_err(|e| col("email", e))?,
        password_hash: row.try_get("password").map_err(|e| col("password", e))?,
        organization_id: organization_id
            .ok_or_else(|| CoreError::persistence(format!("user {id} has no organization")))?
            .into(),
        role: role.parse::<Role>()?,
        reset_token: row
            .try_get("reset_token")
            .map_err(|e| col("reset_token", e))?,
        reset_token_expires: row
            .try_get("reset_token_expires")
            .map_err(|e| col("reset_token_expires", e))?,
    })
}

/// Tenant directory on Postgres.
#[derive(Clone)]
pub struct PostgresOrganizationStore {
    pool: PgPool,
}

impl PostgresOrganizationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for PostgresOrganizationStore {
    async fn find_by_domain(&self, domain: &str) -> CoreResult<Option<Organization>> {
        let row = bounded(
            "organizations.find_by_domain",
            sqlx::query("SELECT id, name, domain FROM organizations WHERE domain = $1")
                .bind(domain)
                .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(org_from_row).transpose()
    }

    async fn find_or_create(&self, domain: &str) -> CoreResult<Organization> {
        // The unique index on domain is the serialization point: the insert
        // either wins and returns the row, or silently yields to a
        // concurrent winner which the re-select picks up.
        let inserted = bounded(
            "organizations.find_or_create",
            sqlx::query(
                "INSERT INTO organizations (name, domain) VALUES ($1, $1) \
                 ON CONFLICT (domain) DO NOTHING \
                 RETURNING id, name, domain",
            )
            .bind(domain)
            .fetch_optional(&self.pool),
        )
        .await?;

        if let Some(row) = inserted {
            return org_from_row(&row);
        }

        self.find_by_domain(domain).await?.ok_or_else(|| {
            CoreError::persistence(format!("organization {domain} missing after conflict"))
        })
    }

    async fn insert(&self, org: NewOrganization) -> CoreResult<Organization> {
        let row = bounded(
            "organizations.insert",
            sqlx::query(
                "INSERT INTO organizations (name, domain) VALUES ($1, $2) \
                 RETURNING id, name, domain",
            )
            .bind(&org.name)
            .bind(&org.domain)
            .fetch_one(&self.pool),
        )
        .await?;

        org_from_row(&row)
    }

    async fn list(&self) -> CoreResult<Vec<Organization>> {
        let rows = bounded(
            "organizations.list",
            sqlx::query("SELECT id, name, domain FROM organizations ORDER BY id")
                .fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(org_from_row).collect()
    }
}

/// Credential store on Postgres.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let row = bounded(
            "users.find_by_email",
            sqlx::query(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: NewUser) -> CoreResult<User> {
        let row = bounded(
            "users.insert",
            sqlx::query(&format!(
                "INSERT INTO users (name, email, password, organization_id, role) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {USER_COLUMNS}"
            ))
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.password_hash.as_deref())
            .bind(user.organization_id.as_i64())
            .bind(user.role.as_str())
            .fetch_one(&self.pool),
        )
        .await?;

        user_from_row(&row)
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        bounded(
            "users.set_reset_token",
            sqlx::query("UPDATE users SET reset_token = $2, reset_token_expires = $3 WHERE id = $1")
                .bind(id.as_i64())
                .bind(token_hash)
                .bind(expires_at)
                .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<UserId>> {
        // Single update: the expiry predicate and the token-field clearing
        // make the token both time-boxed and single-use.
        let row = bounded(
            "users.consume_reset_token",
            sqlx::query(
                "UPDATE users \
                 SET password = $2, reset_token = NULL, reset_token_expires = NULL \
                 WHERE reset_token = $1 AND reset_token_expires > $3 \
                 RETURNING id",
            )
            .bind(token_hash)
            .bind(new_password_hash)
            .bind(now)
            .fetch_optional(&self.pool),
        )
        .await?;

        row.map(|r| {
            r.try_get::<i64, _>("id")
                .map(UserId::from_i64)
                .map_err(|e| CoreError::persistence(format!("users.id: {e}")))
        })
        .transpose()
    }

    async fn find_superadmin(&self) -> CoreResult<Option<User>> {
        let row = bounded(
            "users.find_superadmin",
            sqlx::query(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE role = $1 LIMIT 1"
            ))
            .bind(Role::Superadmin.as_str())
            .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}
