use axum::Json;
use tracing::instrument;

use rolegate_models::MessageResponse;

use crate::docs::ErrorResponse;
use crate::middleware::AuthUser;

/// Content gated on the `view_post` permission
#[utoipa::path(
    get,
    path = "/api/protected",
    responses(
        (status = 200, description = "Caller holds view_post", body = MessageResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - missing permission", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Protected"
)]
#[instrument(skip_all, fields(user_id = auth_user.user_id))]
pub async fn protected_content(auth_user: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("Protected content"))
}
