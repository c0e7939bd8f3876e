use axum::{Router, routing::get};

use super::controller::list_permissions;
use crate::state::AppState;

pub fn init_permissions_router() -> Router<AppState> {
    Router::new().route("/", get(list_permissions))
}
