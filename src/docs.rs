use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use rolegate_auth::TokenPair;
use rolegate_models::{
    CreateRoleDto, CreateUserDto, LoginRequest, LoginResponse, MessageResponse, Permission, Role,
    UpdateRoleDto, UpdateUserDto, User, UserPermissionsResponse,
};

/// Body of every error response.
#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::me,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::get_user_permissions,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::permissions::controller::list_permissions,
        crate::modules::protected::controller::protected_content,
    ),
    components(
        schemas(
            User,
            CreateUserDto,
            UpdateUserDto,
            UserPermissionsResponse,
            Role,
            CreateRoleDto,
            UpdateRoleDto,
            Permission,
            LoginRequest,
            LoginResponse,
            TokenPair,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, token refresh and current identity"),
        (name = "Users", description = "User management endpoints"),
        (name = "Roles", description = "Role management endpoints"),
        (name = "Permissions", description = "Permission catalogue"),
        (name = "Protected", description = "Permission-gated content")
    ),
    info(
        title = "rolegate API",
        version = "0.1.0",
        description = "Role-based access control service: users, roles, permissions and JWT sessions.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
