//! Permission gate.
//!
//! Each route declares the single permission it needs:
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/protected", get(handler))
//!     .route_layer(middleware::from_fn_with_state(
//!         PermissionGate::new(&state, VIEW_POST),
//!         require_permission,
//!     ))
//! ```
//!
//! Stacking several gates requires all of their permissions. The check goes to
//! the credential store on every request, so revoking a grant takes effect on
//! the next call regardless of the roles embedded in the token.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use rolegate_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::modules::permissions::service::PermissionResolver;
use crate::state::AppState;

#[derive(Clone)]
pub struct PermissionGate {
    resolver: PermissionResolver,
    permission: &'static str,
}

impl PermissionGate {
    pub fn new(state: &AppState, permission: &'static str) -> Self {
        Self {
            resolver: state.permissions.clone(),
            permission,
        }
    }
}

/// Must run after [`authenticate`](crate::middleware::auth::authenticate).
/// Lookup failures deny access.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = req
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.user_id)
        .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

    match gate.resolver.has_permission(user_id, gate.permission).await {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => {
            warn!(user_id, permission = gate.permission, "Permission denied");
            Err(AppError::forbidden("Forbidden"))
        }
        Err(e) => {
            warn!(user_id, permission = gate.permission, error = %e, "Permission lookup failed");
            Err(AppError::forbidden("Forbidden"))
        }
    }
}
