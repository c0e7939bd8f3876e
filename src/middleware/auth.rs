//! Authentication gate.
//!
//! [`authenticate`] validates the bearer token once per request and stores an
//! [`AuthUser`] in the request extensions. Handlers and later gates read it
//! back through the [`AuthUser`] extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};

use rolegate_core::AppError;

use crate::state::AppState;

/// Identity taken from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    /// Role names as of token issuance
    pub roles: Vec<String>,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The value must be exactly two space-separated parts with the scheme `Bearer`.
pub fn bearer_token(value: Option<&HeaderValue>) -> Result<&str, AppError> {
    let value = value.ok_or_else(|| AppError::unauthorized("Authorization header required"))?;
    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header format"))?;

    match value.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] => Ok(*token),
        _ => Err(AppError::unauthorized("Invalid authorization header format")),
    }
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers().get(header::AUTHORIZATION))?;
    let claims = state.tokens.validate(token)?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

    req.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username,
        roles: claims.roles,
    });

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))
    }
}
