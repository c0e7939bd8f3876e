use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use rolegate_core::{AppError, PaginationParams};
use rolegate_models::{CreateRoleDto, MessageResponse, Role, UpdateRoleDto};

use super::service::RoleService;
use crate::docs::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a role with a set of permissions
#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created successfully", body = Role),
        (status = 400, description = "Validation error or unknown permission", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Role name already exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Roles"
)]
#[instrument(skip(state))]
pub async fn create_role(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    let role = RoleService::create_role(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// List roles
#[utoipa::path(
    get,
    path = "/api/roles",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of roles ordered by id", body = Vec<Role>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Roles"
)]
#[instrument(skip(state))]
pub async fn get_roles(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<Role>>, AppError> {
    let roles = RoleService::get_roles(state.store.as_ref(), &params).await?;
    Ok(Json(roles))
}

/// Get a role by id
#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(
        ("id" = i64, Path, description = "Role id")
    ),
    responses(
        (status = 200, description = "Role found", body = Role),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Roles"
)]
#[instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Role>, AppError> {
    let role = RoleService::get_role(state.store.as_ref(), id).await?;
    Ok(Json(role))
}

/// Rename a role and optionally replace its permissions
#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    params(
        ("id" = i64, Path, description = "Role id")
    ),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = MessageResponse),
        (status = 400, description = "Validation error or unknown permission", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse),
        (status = 409, description = "Role name already exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Roles"
)]
#[instrument(skip(state))]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleDto>,
) -> Result<Json<MessageResponse>, AppError> {
    RoleService::update_role(state.store.as_ref(), id, dto).await?;
    Ok(Json(MessageResponse::new("Role updated successfully")))
}

/// Delete a role, its permission links and all user assignments
#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(
        ("id" = i64, Path, description = "Role id")
    ),
    responses(
        (status = 200, description = "Role deleted", body = MessageResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Roles"
)]
#[instrument(skip(state))]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    RoleService::delete_role(state.store.as_ref(), id).await?;
    Ok(Json(MessageResponse::new("Role deleted successfully")))
}
