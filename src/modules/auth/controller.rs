use anyhow::anyhow;
use axum::{Json, extract::State, http::HeaderMap};
use tracing::instrument;

use rolegate_auth::TokenPair;
use rolegate_core::AppError;
use rolegate_models::{LoginRequest, LoginResponse, User};

use super::service::AuthService;
use crate::docs::ErrorResponse;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response =
        AuthService::login(state.store.as_ref(), &state.permissions, &state.tokens, dto).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/refresh",
    params(
        ("X-Refresh-Token" = String, Header, description = "Refresh token issued at login")
    ),
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 400, description = "Missing refresh token", body = ErrorResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenPair>, AppError> {
    let token = headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow!("Refresh token required")))?;

    let pair = AuthService::refresh(state.store.as_ref(), &state.tokens, token).await?;
    Ok(Json(pair))
}

/// The authenticated identity, as carried by the access token
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip_all, fields(user_id = auth_user.user_id))]
pub async fn me(auth_user: AuthUser) -> Json<User> {
    Json(User {
        id: auth_user.user_id,
        username: auth_user.username,
        roles: auth_user.roles,
    })
}
