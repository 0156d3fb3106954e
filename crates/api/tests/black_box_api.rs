//! Black-box tests: the production router on an ephemeral port, exercised
//! over HTTP with in-memory stores behind it.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use huddle_api::app::{AppServices, build_app_with_limits};
use huddle_api::config::Config;
use huddle_api::ratelimit::RateLimitState;
use huddle_auth::ProvisionUser;
use huddle_core::{CoreResult, OrganizationStore, Role, UserStore};
use huddle_infra::{InMemoryOrganizationStore, InMemoryRateLimitStore, InMemoryUserStore, Mailer};

/// Captures outbound mail so tests can pull the reset link out of the body.
#[derive(Debug, Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    fn last_body(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, _, body)| body.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> CoreResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_owned(), subject.to_owned(), body.to_owned()));
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        app_name: "huddle-test".into(),
        database_url: String::new(),
        redis_url: String::new(),
        jwt_secret: "test-secret".into(),
        port: 0,
        frontend_url: "http://localhost:5173".into(),
        google: None,
        secure_cookies: false,
    }
}

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    mailer: Arc<RecordingMailer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Quotas high enough that only the dedicated test trips them.
        Self::spawn_with_strict_limit(10_000).await
    }

    async fn spawn_with_strict_limit(strict_max: u64) -> Self {
        let orgs: Arc<dyn OrganizationStore> = Arc::new(InMemoryOrganizationStore::new());
        let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let mailer_handle: Arc<dyn Mailer> = mailer.clone();

        let services = Arc::new(AppServices::new(
            orgs,
            users,
            mailer_handle,
            None,
            test_config(),
        ));

        let limiter: Arc<dyn huddle_infra::RateLimitStore> =
            Arc::new(InMemoryRateLimitStore::new());
        let general = RateLimitState::with_quota(Arc::clone(&limiter), "api", 10_000);
        let strict = RateLimitState::with_quota(limiter, "login", strict_max);

        let app = build_app_with_limits(Arc::clone(&services), general, strict);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            base_url,
            services,
            mailer,
            handle,
        }
    }

    /// Seed a password-credentialed user directly through the service layer.
    async fn seed_user(&self, name: &str, email: &str, password: &str, role: Role) {
        let domain = email.rsplit_once('@').unwrap().1.to_owned();
        self.services
            .identity
            .provision_user(ProvisionUser {
                name: name.into(),
                email: email.into(),
                password: password.into(),
                role,
                domain,
            })
            .await
            .expect("seeding user failed");
    }

    async fn login(&self, client: &reqwest::Client, email: &str, password: &str) -> String {
        let res = client
            .post(format!("{}/v1/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let cookie = res
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .expect("login must set the session cookie")
            .to_str()
            .unwrap();
        let token = cookie
            .strip_prefix("token=")
            .and_then(|rest| rest.split(';').next())
            .expect("cookie must carry the token");
        token.to_owned()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn liveness_endpoints_answer() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK!");

    let res = client
        .get(format!("{}/ping", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "pong");
}

#[tokio::test]
async fn login_returns_session_user_and_cookie() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Alice", "alice@acme.com", "hunter2", Role::Admin)
        .await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/v1/auth/login", srv.base_url))
        .json(&json!({ "email": "alice@acme.com", "password": "hunter2" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["email"], json!("alice@acme.com"));
    assert_eq!(body["user"]["role"], json!("ADMIN"));
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Alice", "alice@acme.com", "hunter2", Role::Admin)
        .await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/v1/auth/login", srv.base_url))
        .json(&json!({ "email": "alice@acme.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/v1/auth/login", srv.base_url))
        .json(&json!({ "email": "ghost@acme.com", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_distinguish_missing_from_invalid_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/v1/organizations", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/v1/organizations", srv.base_url))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn token_is_accepted_from_the_cookie_carrier() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Root", "root@hq.example", "bootstrap-pw", Role::Superadmin)
        .await;
    let client = reqwest::Client::new();
    let token = srv.login(&client, "root@hq.example", "bootstrap-pw").await;

    let res = client
        .get(format!("{}/v1/organizations", srv.base_url))
        .header(reqwest::header::COOKIE, format!("token={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn header_takes_precedence_over_cookie() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Root", "root@hq.example", "bootstrap-pw", Role::Superadmin)
        .await;
    let client = reqwest::Client::new();
    let token = srv.login(&client, "root@hq.example", "bootstrap-pw").await;

    // Valid bearer header + garbage cookie: the header wins.
    let res = client
        .get(format!("{}/v1/organizations", srv.base_url))
        .bearer_auth(&token)
        .header(reqwest::header::COOKIE, "token=garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn only_superadmin_lists_organizations() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Root", "root@hq.example", "bootstrap-pw", Role::Superadmin)
        .await;
    srv.seed_user("Alice", "alice@acme.com", "hunter2", Role::Admin)
        .await;
    let client = reqwest::Client::new();

    let admin_token = srv.login(&client, "alice@acme.com", "hunter2").await;
    let res = client
        .get(format!("{}/v1/organizations", srv.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let root_token = srv.login(&client, "root@hq.example", "bootstrap-pw").await;
    let res = client
        .get(format!("{}/v1/organizations", srv.base_url))
        .bearer_auth(&root_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let orgs: serde_json::Value = res.json().await.unwrap();
    let domains: Vec<_> = orgs
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["domain"].as_str().unwrap().to_owned())
        .collect();
    assert!(domains.contains(&"hq.example".to_owned()));
    assert!(domains.contains(&"acme.com".to_owned()));
}

#[tokio::test]
async fn admin_provisions_users_only_in_own_domain() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Alice", "alice@acme.com", "hunter2", Role::Admin)
        .await;
    let client = reqwest::Client::new();
    let token = srv.login(&client, "alice@acme.com", "hunter2").await;

    // Same domain: allowed.
    let res = client
        .post(format!("{}/v1/users", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Bob",
            "email": "bob@acme.com",
            "password": "pw-bob",
            "role": "USER",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], json!("bob@acme.com"));

    // Foreign domain: denied with the domain-mismatch message.
    let res = client
        .post(format!("{}/v1/users", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Carl",
            "email": "carl@other.com",
            "password": "pw-carl",
            "role": "USER",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        json!("Forbidden: Admins can only create users within their own organization.")
    );
}

#[tokio::test]
async fn plain_users_cannot_provision() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Uma", "uma@acme.com", "pw-uma", Role::User)
        .await;
    let client = reqwest::Client::new();
    let token = srv.login(&client, "uma@acme.com", "pw-uma").await;

    let res = client
        .post(format!("{}/v1/users", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Eve",
            "email": "eve@acme.com",
            "password": "pw-eve",
            "role": "USER",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        json!("Forbidden: Only SUPERADMIN or ADMIN can create users.")
    );
}

#[tokio::test]
async fn duplicate_user_is_a_conflict() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Alice", "alice@acme.com", "hunter2", Role::Admin)
        .await;
    let client = reqwest::Client::new();
    let token = srv.login(&client, "alice@acme.com", "hunter2").await;

    let create = || {
        client
            .post(format!("{}/v1/users", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "name": "Bob",
                "email": "bob@acme.com",
                "password": "pw-bob",
                "role": "USER",
            }))
            .send()
    };

    assert_eq!(create().await.unwrap().status(), StatusCode::CREATED);
    assert_eq!(create().await.unwrap().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn organization_creation_is_domain_scoped() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Alice", "alice@acme.com", "hunter2", Role::Admin)
        .await;
    srv.seed_user("Root", "root@hq.example", "bootstrap-pw", Role::Superadmin)
        .await;
    let client = reqwest::Client::new();

    let admin_token = srv.login(&client, "alice@acme.com", "hunter2").await;
    let res = client
        .post(format!("{}/v1/organizations", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "name": "Somewhere Else", "domain": "elsewhere.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // SUPERADMIN may create under any domain.
    let root_token = srv.login(&client, "root@hq.example", "bootstrap-pw").await;
    let res = client
        .post(format!("{}/v1/organizations", srv.base_url))
        .bearer_auth(&root_token)
        .json(&json!({ "name": "Somewhere Else", "domain": "elsewhere.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["domain"], json!("elsewhere.com"));
}

#[tokio::test]
async fn password_reset_flow_end_to_end() {
    let srv = TestServer::spawn().await;
    srv.seed_user("Alice", "alice@acme.com", "hunter2", Role::Admin)
        .await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/v1/auth/reset-password", srv.base_url))
        .json(&json!({ "email": "alice@acme.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The plaintext token only ever leaves through the mailer.
    let mail_body = srv.mailer.last_body().expect("reset email must be sent");
    let token = mail_body
        .split("token=")
        .nth(1)
        .expect("reset link must carry the token")
        .trim()
        .to_owned();

    let res = client
        .post(format!("{}/v1/auth/set-password", srv.base_url))
        .json(&json!({ "resetToken": token, "newPassword": "NewPass1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Old password out, new password in.
    let res = client
        .post(format!("{}/v1/auth/login", srv.base_url))
        .json(&json!({ "email": "alice@acme.com", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    srv.login(&client, "alice@acme.com", "NewPass1").await;

    // The token was consumed by the first use.
    let res = client
        .post(format!("{}/v1/auth/set-password", srv.base_url))
        .json(&json!({ "resetToken": token, "newPassword": "Sneaky2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_for_unknown_email_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/v1/auth/reset-password", srv.base_url))
        .json(&json!({ "email": "ghost@acme.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_endpoints_are_strictly_rate_limited() {
    let srv = TestServer::spawn_with_strict_limit(2).await;
    srv.seed_user("Alice", "alice@acme.com", "hunter2", Role::Admin)
        .await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let res = client
            .post(format!("{}/v1/auth/reset-password", srv.base_url))
            .json(&json!({ "email": "alice@acme.com" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .post(format!("{}/v1/auth/reset-password", srv.base_url))
        .json(&json!({ "email": "alice@acme.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/v1/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn malformed_bodies_are_rejected_at_the_boundary() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/v1/auth/login", srv.base_url))
        .json(&json!({ "email": "not-an-email", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/v1/auth/login", srv.base_url))
        .json(&json!({ "email": "alice@acme.com", "password": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
