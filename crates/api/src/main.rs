use std::net::SocketAddr;
use std::sync::Arc;

use huddle_api::app::oauth::GoogleOauth;
use huddle_api::app::{AppServices, build_app};
use huddle_api::config::Config;
use huddle_core::{OrganizationStore, UserStore};
use huddle_infra::{
    LogMailer, Mailer, PostgresOrganizationStore, PostgresUserStore, RateLimitStore,
    RedisRateLimitStore, db,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    huddle_observability::init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let orgs: Arc<dyn OrganizationStore> = Arc::new(PostgresOrganizationStore::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(PostgresUserStore::new(pool));
    let limiter: Arc<dyn RateLimitStore> = Arc::new(RedisRateLimitStore::new(&config.redis_url)?);
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new());

    let google = match &config.google {
        Some(google_config) => Some(GoogleOauth::new(google_config)?),
        None => None,
    };

    let port = config.port;
    let services = Arc::new(AppServices::new(orgs, users, mailer, google, config));
    let app = build_app(services, limiter);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
