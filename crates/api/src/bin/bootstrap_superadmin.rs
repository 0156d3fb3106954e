//! One-shot SUPERADMIN bootstrap.
//!
//! Refuses to run when any SUPERADMIN already exists. This check is the only
//! enforcement of the at-most-one-SUPERADMIN rule; there is no standing
//! constraint behind it.

use std::sync::Arc;

use anyhow::{Context, bail};

use huddle_auth::{IdentityService, ProvisionUser};
use huddle_core::{OrganizationStore, Role, UserStore, email_domain};
use huddle_infra::{PostgresOrganizationStore, PostgresUserStore, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    huddle_observability::init();

    let name = std::env::var("SUPERADMIN_NAME").context("SUPERADMIN_NAME is not set")?;
    let email = std::env::var("SUPERADMIN_EMAIL").context("SUPERADMIN_EMAIL is not set")?;
    let password = std::env::var("SUPERADMIN_PASSWORD").context("SUPERADMIN_PASSWORD is not set")?;
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let pool = db::connect(&database_url).await?;
    db::run_migrations(&pool).await?;

    let orgs: Arc<dyn OrganizationStore> = Arc::new(PostgresOrganizationStore::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(PostgresUserStore::new(pool));
    let identity = IdentityService::new(orgs, users);

    tracing::info!("starting SUPERADMIN bootstrap");

    if identity.superadmin_exists().await? {
        bail!("a SUPERADMIN already exists; aborting");
    }

    let domain = email_domain(&email)?.to_owned();

    let superadmin = identity
        .provision_user(ProvisionUser {
            name,
            email,
            password,
            role: Role::Superadmin,
            domain,
        })
        .await?;

    tracing::info!(
        user_id = %superadmin.id,
        org_id = %superadmin.organization_id,
        "SUPERADMIN created successfully"
    );
    Ok(())
}
