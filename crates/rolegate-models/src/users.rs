use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A user as exposed by the API: identity plus role names in assignment order.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: i64,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = json!(["editor"]))]
    pub roles: Vec<String>,
}

/// Stored login material. Never serialized into a response.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Username must be between 1 and 50 characters"
    ))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret1")]
    pub password: String,
    /// Role names to assign. Every name must exist.
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Username must be between 1 and 50 characters"
    ))]
    pub username: String,
    /// Replaces the full role set when present; omitted keeps current roles.
    pub roles: Option<Vec<String>>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct UserPermissionsResponse {
    pub user_id: i64,
    pub permissions: Vec<String>,
}
