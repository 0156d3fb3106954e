//! Service wiring shared by every handler.

use std::sync::Arc;

use huddle_auth::IdentityService;
use huddle_core::{OrganizationStore, UserStore};
use huddle_infra::Mailer;

use crate::app::oauth::GoogleOauth;
use crate::config::Config;

/// Injected resource handles for the request path.
///
/// Constructed once at startup (or per test harness) and shared via an
/// `Extension`; nothing here is ambient global state.
pub struct AppServices {
    pub identity: IdentityService<Arc<dyn OrganizationStore>, Arc<dyn UserStore>>,
    pub mailer: Arc<dyn Mailer>,
    pub google: Option<GoogleOauth>,
    pub config: Config,
}

impl AppServices {
    pub fn new(
        orgs: Arc<dyn OrganizationStore>,
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        google: Option<GoogleOauth>,
        config: Config,
    ) -> Self {
        Self {
            identity: IdentityService::new(orgs, users),
            mailer,
            google,
            config,
        }
    }

    pub fn jwt_secret(&self) -> &[u8] {
        self.config.jwt_secret.as_bytes()
    }
}
