//! Environment-supplied configuration.
//!
//! Everything external — connection strings, secrets, OAuth credentials —
//! arrives through the environment; nothing here is part of the core.

use anyhow::Context;

/// Google OAuth client credentials; absent when SSO is not configured.
#[derive(Debug, Clone)]
pub struct GoogleOauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub port: u16,
    /// Base URL for links delivered by email (reset-password page).
    pub frontend_url: String,
    pub google: Option<GoogleOauthConfig>,
    /// Marks session cookies `Secure`; off only in development.
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let redis_url = std::env::var("REDIS_URL").context("REDIS_URL is not set")?;

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().context("PORT is not a valid port")?,
            Err(_) => 3000,
        };

        let app_name = std::env::var("APP_NAME").unwrap_or_else(|_| "huddle".to_string());
        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let google = match (
            std::env::var("GOOGLE_CLIENT_ID"),
            std::env::var("GOOGLE_CLIENT_SECRET"),
            std::env::var("GOOGLE_CALLBACK_URL"),
        ) {
            (Ok(client_id), Ok(client_secret), Ok(callback_url)) => Some(GoogleOauthConfig {
                client_id,
                client_secret,
                callback_url,
            }),
            _ => {
                tracing::info!("Google OAuth credentials not set; SSO disabled");
                None
            }
        };

        let secure_cookies =
            std::env::var("APP_ENV").map(|e| e == "production").unwrap_or(false);

        Ok(Self {
            app_name,
            database_url,
            redis_url,
            jwt_secret,
            port,
            frontend_url,
            google,
            secure_cookies,
        })
    }
}
