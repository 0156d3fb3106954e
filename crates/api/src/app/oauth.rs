//! Google OAuth 2.0 client (authorization-code flow).

use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;
use std::time::Duration;

use huddle_core::{CoreError, CoreResult};

use crate::config::GoogleOauthConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Profile fields consumed from the userinfo endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub struct GoogleOauth {
    client: BasicClient,
    http: reqwest::Client,
}

impl GoogleOauth {
    pub fn new(config: &GoogleOauthConfig) -> CoreResult<Self> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                .map_err(|e| CoreError::validation(format!("auth url: {e}")))?,
            Some(
                TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                    .map_err(|e| CoreError::validation(format!("token url: {e}")))?,
            ),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.callback_url.clone())
                .map_err(|e| CoreError::validation(format!("callback url: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| CoreError::persistence(format!("http client: {e}")))?;

        Ok(Self { client, http })
    }

    /// Consent-screen URL for the login redirect (profile + email scopes).
    pub fn authorize_url(&self) -> String {
        let (url, _csrf) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("profile".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .url();
        url.to_string()
    }

    /// Exchange the callback code for an access token.
    pub async fn exchange_code(&self, code: &str) -> CoreResult<String> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| CoreError::persistence(format!("google token exchange: {e}")))?;

        Ok(token.access_token().secret().to_string())
    }

    /// Fetch the user's profile with the exchanged access token.
    pub async fn fetch_profile(&self, access_token: &str) -> CoreResult<GoogleProfile> {
        self.http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| CoreError::persistence(format!("google userinfo: {e}")))?
            .json::<GoogleProfile>()
            .await
            .map_err(|e| CoreError::persistence(format!("google userinfo body: {e}")))
    }
}
