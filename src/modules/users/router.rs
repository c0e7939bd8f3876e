use axum::{Router, routing::get};

use super::controller::{delete_user, get_user, get_user_permissions, get_users, update_user};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/permissions", get(get_user_permissions))
}
