use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use rolegate::router::init_router;
use rolegate::state::AppState;
use rolegate_auth::TokenService;
use rolegate_config::{CorsConfig, JwtConfig};
use rolegate_core::hash_password;
use rolegate_db::{CredentialStore, MemoryCredentialStore};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration_test_secret";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCredentialStore>,
    pub tokens: TokenService,
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub password: String,
}

pub fn test_tokens() -> TokenService {
    TokenService::new(&JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 7200,
    })
    .unwrap()
}

pub fn setup_test_app() -> TestApp {
    let store = Arc::new(MemoryCredentialStore::new());
    let tokens = test_tokens();
    let state = AppState::new(store.clone(), tokens.clone(), CorsConfig::default());

    TestApp {
        router: init_router(state),
        store,
        tokens,
    }
}

#[allow(dead_code)]
impl TestApp {
    pub async fn create_role(&self, name: &str, permissions: &[&str]) -> i64 {
        let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        self.store.create_role(name, &permissions).await.unwrap().id
    }

    pub async fn create_user(&self, username: &str, password: &str, roles: &[&str]) -> TestUser {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        let digest = hash_password(password).unwrap();
        let user = self
            .store
            .create_user(username, &digest, &roles)
            .await
            .unwrap();

        TestUser {
            id: user.id,
            username: user.username,
            password: password.to_string(),
        }
    }

    /// An access token for an existing user, as login would issue it.
    pub async fn token_for(&self, user_id: i64) -> String {
        let user = self.store.get_user(user_id).await.unwrap();
        self.tokens
            .issue(user.id, &user.username, &user.roles)
            .unwrap()
            .access_token
    }

    /// A user holding a role that grants every seeded permission.
    pub async fn admin_token(&self) -> String {
        self.create_role("admin", rolegate_core::permissions::ALL)
            .await;
        let admin = self.create_user("admin", "adminpass", &["admin"]).await;
        self.token_for(admin.id).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn delete_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[allow(dead_code)]
pub async fn assert_error(response: Response<Body>, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"], message);
}
