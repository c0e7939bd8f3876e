use axum::{Router, middleware, routing::get};

use rolegate_core::permissions::VIEW_POST;

use super::controller::protected_content;
use crate::middleware::{PermissionGate, require_permission};
use crate::state::AppState;

pub fn init_protected_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/protected", get(protected_content))
        .route_layer(middleware::from_fn_with_state(
            PermissionGate::new(state, VIEW_POST),
            require_permission,
        ))
}
