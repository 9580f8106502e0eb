use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use depthstudio_api::app::{build_app, services::AppServices};
use depthstudio_auth::{
    Hs256IdentityProvider, Identity, IdentityProvider, InMemoryUserDirectory, JwtClaims,
    ProviderError, Role, User, UserDirectory,
};
use depthstudio_core::UserId;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn with_users(users: Vec<User>) -> Self {
        let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::with_users(users));
        let provider = Arc::new(Hs256IdentityProvider::new(JWT_SECRET));
        Self::spawn(AppServices::new(provider, directory, Duration::from_secs(2))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

fn mint_token(sub: &str, issued_at: chrono::DateTime<Utc>, expires_at: chrono::DateTime<Utc>) -> String {
    let claims = JwtClaims {
        sub: uid(sub),
        email: Some(format!("{sub}@depth.studio")),
        issued_at,
        expires_at,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn token_for(sub: &str) -> String {
    let now = Utc::now();
    mint_token(sub, now - ChronoDuration::seconds(5), now + ChronoDuration::minutes(10))
}

fn studio_users() -> Vec<User> {
    let now = Utc::now();
    vec![
        User::active(uid("ada"), "Ada", Role::Admin, now),
        User::active(uid("pia"), "Pia", Role::Photographer, now),
        User::active(uid("mia"), "Mia", Role::MarketingCoordinator, now),
    ]
}

async fn error_code(res: reqwest::Response) -> String {
    let body: serde_json::Value = res.json().await.unwrap();
    body["error"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::with_users(vec![]).await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_credential_is_401_with_challenge() {
    let srv = TestServer::with_users(studio_users()).await;

    let res = reqwest::Client::new().get(srv.url("/whoami")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");
    assert_eq!(error_code(res).await, "unauthenticated");
}

#[tokio::test]
async fn non_bearer_scheme_is_401() {
    let srv = TestServer::with_users(studio_users()).await;

    let res = reqwest::Client::new()
        .get(srv.url("/whoami"))
        .basic_auth("ada", Some("pw"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_credential_is_401_for_any_action() {
    let srv = TestServer::with_users(studio_users()).await;
    let now = Utc::now();
    let expired = mint_token("ada", now - ChronoDuration::hours(2), now - ChronoDuration::hours(1));

    let client = reqwest::Client::new();
    for path in ["/whoami", "/admin/users", "/schedules"] {
        let res = client.get(srv.url(path)).bearer_auth(&expired).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn photographer_cannot_manage_users() {
    let srv = TestServer::with_users(studio_users()).await;
    let token = token_for("pia");
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/admin/users")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(res).await, "forbidden");

    let res = client.get(srv.url("/reports/financial")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client.post(srv.url("/content")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "photographer");
    assert_eq!(body["action"], "upload_content");
}

#[tokio::test]
async fn marketing_coordinator_sees_financial_reports() {
    let srv = TestServer::with_users(studio_users()).await;

    let res = reqwest::Client::new()
        .get(srv.url("/reports/financial"))
        .bearer_auth(token_for("mia"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn onboarding_flow_register_then_select_role() {
    let srv = TestServer::with_users(studio_users()).await;
    let token = token_for("newbie");
    let client = reqwest::Client::new();

    // Valid credential but no user record yet.
    let res = client.get(srv.url("/whoami")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // A body is optional, but a malformed one is rejected before anything is stored.
    let res = client
        .post(srv.url("/onboarding/register"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"display_name\":")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");

    let res = client.get(srv.url("/whoami")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Register (twice: idempotent).
    for _ in 0..2 {
        let res = client
            .post(srv.url("/onboarding/register"))
            .bearer_auth(&token)
            .json(&json!({ "display_name": "New Person" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["user"]["status"], "pending");
        assert_eq!(body["user"]["email"], "newbie@depth.studio");
    }

    // Pending users are role_unassigned, not forbidden, even for admin actions.
    let res = client.get(srv.url("/admin/users")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(error_code(res).await, "role_unassigned");

    // Admin cannot be self-selected.
    let res = client
        .post(srv.url("/onboarding/role"))
        .bearer_auth(&token)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/onboarding/role"))
        .bearer_auth(&token)
        .json(&json!({ "role": "brand_coordinator" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/whoami")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "brand_coordinator");
    assert_eq!(body["status"], "active");

    // Role selection happens once; afterwards only an admin changes roles.
    let res = client
        .post(srv.url("/onboarding/role"))
        .bearer_auth(&token)
        .json(&json!({ "role": "photographer" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(res).await, "invariant_violation");
}

#[tokio::test]
async fn register_without_body_uses_provider_email() {
    let srv = TestServer::with_users(vec![]).await;

    let res = reqwest::Client::new()
        .post(srv.url("/onboarding/register"))
        .bearer_auth(token_for("quiet"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["display_name"], "quiet@depth.studio");
    assert_eq!(body["user"]["status"], "pending");
}

#[tokio::test]
async fn suspension_denies_everything_until_activation() {
    let srv = TestServer::with_users(studio_users()).await;
    let admin = token_for("ada");
    let pia = token_for("pia");
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/admin/users/pia/suspend"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for (method, path) in [
        ("GET", "/schedules"),
        ("POST", "/content"),
        ("GET", "/whoami"),
        ("GET", "/access/check?action=upload_content"),
    ] {
        let req = match method {
            "GET" => client.get(srv.url(path)),
            _ => client.post(srv.url(path)),
        };
        let res = req.bearer_auth(&pia).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{path}");
        assert_eq!(error_code(res).await, "forbidden", "{path}");
    }

    let res = client
        .post(srv.url("/admin/users/pia/activate"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/schedules")).bearer_auth(&pia).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_cannot_suspend_self() {
    let srv = TestServer::with_users(studio_users()).await;

    let res = reqwest::Client::new()
        .post(srv.url("/admin/users/ada/suspend"))
        .bearer_auth(token_for("ada"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn access_check_is_advisory() {
    let srv = TestServer::with_users(studio_users()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/access/check?action=manage_users"))
        .bearer_auth(token_for("pia"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], false);
    assert_eq!(body["explanation"]["denial_reason"]["kind"], "missing_permission");

    let res = client
        .get(srv.url("/access/check?action=Not-An-Action"))
        .bearer_auth(token_for("pia"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rbac_roles_and_explain() {
    let srv = TestServer::with_users(studio_users()).await;
    let client = reqwest::Client::new();
    let admin = token_for("ada");

    let res = client.get(srv.url("/admin/rbac/roles")).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["roles"].as_array().unwrap().len(), 4);

    let res = client
        .get(srv.url("/admin/rbac/explain/mia?action=view_financial_reports"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["granted"], true);
}

struct HangingProvider;

#[async_trait]
impl IdentityProvider for HangingProvider {
    async fn verify(&self, _credential: &str) -> Result<Identity, ProviderError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(ProviderError::Unavailable("unreachable".to_string()))
    }
}

#[tokio::test]
async fn provider_timeout_is_503_not_401() {
    let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::with_users(studio_users()));
    let services = AppServices::new(Arc::new(HangingProvider), directory, Duration::from_millis(100));
    let srv = TestServer::spawn(services).await;

    let res = reqwest::Client::new()
        .get(srv.url("/schedules"))
        .bearer_auth("any-token")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(res).await, "provider_unavailable");
}
