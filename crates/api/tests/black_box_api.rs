use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use crafterp_api::app::{self, AppServices};
use crafterp_auth::{AccountStatus, InMemoryCredentialStore, JwtClaims, Role};
use crafterp_infra::AuthSettings;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

const SECRET: &str = "black-box-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let settings = AuthSettings {
            jwt_secret: SECRET.to_string(),
            token_ttl_minutes: 60,
            bcrypt_cost: 4,
            bootstrap_first_admin: false,
        };
        let store = Arc::new(InMemoryCredentialStore::new());
        let services = Arc::new(AppServices::new(&settings, store).expect("valid services"));

        // Build app (same router as prod), but bind to an ephemeral port.
        let app = app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn signup(&self, username: &str, password: &str) -> serde_json::Value {
        let res = self
            .client
            .post(self.url("/auth/signup"))
            .json(&json!({"username": username, "password": password, "staff_id": 1}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await
            .unwrap()
    }

    async fn token(&self, username: &str, password: &str) -> String {
        let res = self.login(username, password).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, subject: i64, role: Role) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: subject.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + ChronoDuration::minutes(10)).timestamp(),
        jti: None,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn sales_account_reaches_sales_but_not_admin() {
    let server = TestServer::spawn().await;
    let account = server.signup("alice", "s3cret-pass").await;
    assert_eq!(account["role"], "sales");
    assert_eq!(account["is_active"], true);
    assert!(account.get("password_hash").is_none());

    let token = server.token("alice", "s3cret-pass").await;

    let res = server.get("/sales/context", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let ctx: serde_json::Value = res.json().await.unwrap();
    assert_eq!(ctx["username"], "alice");
    assert_eq!(ctx["role"], "sales");

    let res = server.get("/admin/context", &token).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    let res = server.get("/hr/context", &token).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get("/auth/me", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_forged_tokens_are_unauthorized() {
    let server = TestServer::spawn().await;
    server.signup("bob", "hunter22").await;

    let res = server.client.get(server.url("/sales/context")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");

    let forged = mint_jwt("some-other-secret", 1, Role::Admin);
    let res = server.get("/admin/context", &forged).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.get("/sales/context", "not-a-jwt").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Correctly signed, but for a subject the store has never seen.
    let orphan = mint_jwt(SECRET, 999, Role::Sales);
    let res = server.get("/sales/context", &orphan).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let server = TestServer::spawn().await;
    server.signup("carol", "correct-horse").await;

    let wrong_password = server.login("carol", "battery-staple").await;
    let unknown_user = server.login("mallory", "battery-staple").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let a: serde_json::Value = wrong_password.json().await.unwrap();
    let b: serde_json::Value = unknown_user.json().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn signup_rejects_role_missing_staff_id_and_duplicates() {
    let server = TestServer::spawn().await;
    server.signup("dave", "password1").await;

    let res = server
        .client
        .post(server.url("/auth/signup"))
        .json(&json!({"username": "eve", "password": "password1", "staff_id": 2, "role": "admin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .post(server.url("/auth/signup"))
        .json(&json!({"username": "dave", "password": "password2", "staff_id": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = server
        .client
        .post(server.url("/auth/signup"))
        .json(&json!({"username": "erin", "password": "password3"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("staff_id"));

    let res = server
        .client
        .post(server.url("/auth/signup"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

/// Admin accounts cannot be self-registered, so this server enables the
/// first-admin bootstrap and the first signup becomes the admin.
#[tokio::test]
async fn admin_manages_staff_and_deactivation_revokes_access() {
    let settings = AuthSettings {
        jwt_secret: SECRET.to_string(),
        token_ttl_minutes: 60,
        bcrypt_cost: 4,
        bootstrap_first_admin: true,
    };
    let store = Arc::new(InMemoryCredentialStore::new());
    let services = Arc::new(AppServices::new(&settings, store).unwrap());
    let app = app::build_app(services);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let server = TestServer {
        base_url: base,
        client: reqwest::Client::new(),
        handle,
    };

    let root = server.signup("root", "root-password").await;
    assert_eq!(root["role"], "admin");
    let admin_token = server.token("root", "root-password").await;

    let res = server
        .client
        .post(server.url("/admin/staff"))
        .bearer_auth(&admin_token)
        .json(&json!({"username": "frank", "password": "ledger-pass", "role": "accounts"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let frank: serde_json::Value = res.json().await.unwrap();
    let frank_id = frank["id"].as_i64().unwrap();

    let res = server
        .client
        .post(server.url("/admin/staff"))
        .bearer_auth(&admin_token)
        .json(&json!({"username": "grace", "password": "x-pass-123", "role": "auditor"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let frank_token = server.token("frank", "ledger-pass").await;
    assert_eq!(server.get("/accounts/context", &frank_token).await.status(), StatusCode::OK);
    assert_eq!(server.get("/sales/context", &frank_token).await.status(), StatusCode::FORBIDDEN);

    // A role change takes effect on the next request, not at token expiry.
    let res = server
        .client
        .patch(server.url(&format!("/admin/staff/{frank_id}/role")))
        .bearer_auth(&admin_token)
        .json(&json!({"role": "crm"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(server.get("/sales/context", &frank_token).await.status(), StatusCode::OK);

    let res = server
        .client
        .delete(server.url(&format!("/admin/staff/{frank_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["is_active"], false);

    assert_eq!(
        server.get("/sales/context", &frank_token).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(server.login("frank", "ledger-pass").await.status(), StatusCode::UNAUTHORIZED);

    let res = server.get("/admin/staff/4242", &admin_token).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .patch(server.url(&format!("/admin/staff/{frank_id}/status")))
        .bearer_auth(&admin_token)
        .json(&json!({"status": AccountStatus::Active.as_str()}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(server.get("/sales/context", &frank_token).await.status(), StatusCode::OK);
}
