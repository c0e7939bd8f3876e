use axum::{Json, extract::State};
use tracing::instrument;

use rolegate_core::AppError;
use rolegate_models::Permission;

use crate::docs::ErrorResponse;
use crate::state::AppState;

/// List the permission catalogue
#[utoipa::path(
    get,
    path = "/api/permissions",
    responses(
        (status = 200, description = "All permissions", body = Vec<Permission>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permissions"
)]
#[instrument(skip(state))]
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions = state.store.list_permissions().await?;
    Ok(Json(permissions))
}
