mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{
    assert_error, body_json, get_request, json_request, setup_test_app, test_tokens,
};
use rolegate::router::init_router;
use rolegate::state::AppState;
use rolegate_config::CorsConfig;
use rolegate_db::{CredentialStore, MemoryCredentialStore, StoreError, StoreResult};
use rolegate_models::{Permission, Role, User, UserCredentials};
use serde_json::json;
use tower::ServiceExt;

/// Delegates to the in-memory store but cannot answer permission checks.
struct UnreachablePermissions(MemoryCredentialStore);

#[async_trait]
impl CredentialStore for UnreachablePermissions {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[String],
    ) -> StoreResult<User> {
        self.0.create_user(username, password_hash, roles).await
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>> {
        self.0.find_credentials(username).await
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        self.0.get_user(id).await
    }

    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<Vec<User>> {
        self.0.list_users(limit, offset).await
    }

    async fn update_user(
        &self,
        id: i64,
        username: &str,
        roles: Option<&[String]>,
    ) -> StoreResult<User> {
        self.0.update_user(id, username, roles).await
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        self.0.delete_user(id).await
    }

    async fn create_role(&self, name: &str, permissions: &[String]) -> StoreResult<Role> {
        self.0.create_role(name, permissions).await
    }

    async fn get_role(&self, id: i64) -> StoreResult<Role> {
        self.0.get_role(id).await
    }

    async fn list_roles(&self, limit: i64, offset: i64) -> StoreResult<Vec<Role>> {
        self.0.list_roles(limit, offset).await
    }

    async fn update_role(
        &self,
        id: i64,
        name: &str,
        permissions: Option<&[String]>,
    ) -> StoreResult<Role> {
        self.0.update_role(id, name, permissions).await
    }

    async fn delete_role(&self, id: i64) -> StoreResult<()> {
        self.0.delete_role(id).await
    }

    async fn roles_of(&self, user_id: i64) -> StoreResult<Vec<String>> {
        self.0.roles_of(user_id).await
    }

    async fn permissions_of(&self, role_id: i64) -> StoreResult<Vec<String>> {
        self.0.permissions_of(role_id).await
    }

    async fn effective_permissions(&self, user_id: i64) -> StoreResult<Vec<String>> {
        self.0.effective_permissions(user_id).await
    }

    async fn has_permission(&self, _user_id: i64, _permission: &str) -> StoreResult<bool> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        self.0.list_permissions().await
    }
}

#[tokio::test]
async fn test_login_then_access_protected_content() {
    let app = setup_test_app();
    app.create_role("editor", &["view_post", "edit_post"]).await;

    let response = app
        .send(json_request(
            "POST",
            "/api/users",
            None,
            &json!({ "username": "alice", "password": "secret1", "roles": ["editor"] }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .send(json_request(
            "POST",
            "/api/login",
            None,
            &json!({ "username": "alice", "password": "secret1" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let response = app.send(get_request("/api/protected", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Protected content");
}

#[tokio::test]
async fn test_protected_without_token() {
    let app = setup_test_app();

    let response = app.send(get_request("/api/protected", None)).await;

    assert_error(
        response,
        StatusCode::UNAUTHORIZED,
        "Authorization header required",
    )
    .await;
}

#[tokio::test]
async fn test_protected_with_garbage_token() {
    let app = setup_test_app();

    let response = app
        .send(get_request("/api/protected", Some("not.a.jwt")))
        .await;

    assert_error(response, StatusCode::UNAUTHORIZED, "Invalid or expired token").await;
}

#[tokio::test]
async fn test_protected_without_permission() {
    let app = setup_test_app();
    app.create_role("author", &["create_post"]).await;
    let user = app.create_user("bob", "secret1", &["author"]).await;
    let token = app.token_for(user.id).await;

    let response = app.send(get_request("/api/protected", Some(&token))).await;

    assert_error(response, StatusCode::FORBIDDEN, "Forbidden").await;
}

#[tokio::test]
async fn test_protected_with_no_roles() {
    let app = setup_test_app();
    let user = app.create_user("carol", "secret1", &[]).await;
    let token = app.token_for(user.id).await;

    let response = app.send(get_request("/api/protected", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_revoked_permission_applies_to_live_token() {
    let app = setup_test_app();
    let role_id = app.create_role("editor", &["view_post"]).await;
    let user = app.create_user("alice", "secret1", &["editor"]).await;
    let token = app.token_for(user.id).await;

    let response = app.send(get_request("/api/protected", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    app.store
        .update_role(role_id, "editor", Some(&[]))
        .await
        .unwrap();

    let response = app.send(get_request("/api/protected", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_granted_permission_applies_without_new_token() {
    let app = setup_test_app();
    let user = app.create_user("alice", "secret1", &[]).await;
    let token = app.token_for(user.id).await;

    app.create_role("reader", &["view_post"]).await;
    app.store
        .update_user(user.id, "alice", Some(&["reader".to_string()]))
        .await
        .unwrap();

    let response = app.send(get_request("/api/protected", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_deleted_user_token_is_forbidden() {
    let app = setup_test_app();
    app.create_role("editor", &["view_post"]).await;
    let user = app.create_user("alice", "secret1", &["editor"]).await;
    let token = app.token_for(user.id).await;
    app.store.delete_user(user.id).await.unwrap();

    let response = app.send(get_request("/api/protected", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_permission_lookup_failure_is_forbidden() {
    let inner = MemoryCredentialStore::new();
    inner
        .create_role("editor", &["view_post".to_string()])
        .await
        .unwrap();
    let user = inner
        .create_user("alice", "hash", &["editor".to_string()])
        .await
        .unwrap();

    let tokens = test_tokens();
    let token = tokens
        .issue(user.id, &user.username, &user.roles)
        .unwrap()
        .access_token;
    let state = AppState::new(
        Arc::new(UnreachablePermissions(inner)),
        tokens,
        CorsConfig::default(),
    );

    let response = init_router(state)
        .oneshot(get_request("/api/protected", Some(&token)))
        .await
        .unwrap();

    assert_error(response, StatusCode::FORBIDDEN, "Forbidden").await;
}
