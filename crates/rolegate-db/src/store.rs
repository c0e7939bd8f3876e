//! The credential store contract.

use async_trait::async_trait;
use thiserror::Error;

use rolegate_core::AppError;
use rolegate_models::{Permission, Role, User, UserCredentials};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Invalid permission: {0}")]
    InvalidPermission(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn user_not_found() -> Self {
        StoreError::NotFound("User")
    }

    pub(crate) fn role_not_found() -> Self {
        StoreError::NotFound("Role")
    }

    pub(crate) fn duplicate_username() -> Self {
        StoreError::Conflict("Username already exists".to_string())
    }

    pub(crate) fn duplicate_role_name() -> Self {
        StoreError::Conflict("Role name already exists".to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::not_found(err),
            StoreError::Conflict(_) => AppError::conflict(err),
            StoreError::InvalidRole(_) | StoreError::InvalidPermission(_) => {
                AppError::bad_request(err)
            }
            StoreError::Database(_) | StoreError::Migration(_) => AppError::internal(err),
        }
    }
}

/// Persistence for users, roles and permissions.
///
/// Roles and permissions are referenced by name at this boundary. Writes that
/// touch link rows are atomic: an unknown name fails the whole call and leaves
/// no trace. Duplicate names in an input list are collapsed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user and links `roles`. Fails with `InvalidRole` on the first
    /// unknown role and with `Conflict` when the username is taken.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[String],
    ) -> StoreResult<User>;

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>>;

    async fn get_user(&self, id: i64) -> StoreResult<User>;

    /// Users ordered by id.
    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<Vec<User>>;

    /// Renames the user and, when `roles` is `Some`, replaces the full role set.
    async fn update_user(
        &self,
        id: i64,
        username: &str,
        roles: Option<&[String]>,
    ) -> StoreResult<User>;

    /// Removes the user and its role links.
    async fn delete_user(&self, id: i64) -> StoreResult<()>;

    async fn create_role(&self, name: &str, permissions: &[String]) -> StoreResult<Role>;

    async fn get_role(&self, id: i64) -> StoreResult<Role>;

    /// Roles ordered by id.
    async fn list_roles(&self, limit: i64, offset: i64) -> StoreResult<Vec<Role>>;

    async fn update_role(
        &self,
        id: i64,
        name: &str,
        permissions: Option<&[String]>,
    ) -> StoreResult<Role>;

    /// Removes the role, its permission links and every user assignment of it.
    async fn delete_role(&self, id: i64) -> StoreResult<()>;

    /// Role names held by the user, in assignment order. Empty for unknown users.
    async fn roles_of(&self, user_id: i64) -> StoreResult<Vec<String>>;

    /// Permission names granted by the role, in grant order.
    async fn permissions_of(&self, role_id: i64) -> StoreResult<Vec<String>>;

    /// Distinct union of permissions across the user's roles, sorted by name.
    async fn effective_permissions(&self, user_id: i64) -> StoreResult<Vec<String>>;

    /// Whether any role held by the user grants `permission`. Unknown users and
    /// unknown permission names yield `false`.
    async fn has_permission(&self, user_id: i64, permission: &str) -> StoreResult<bool>;

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>>;
}

/// Input names with duplicates removed, first occurrence kept.
pub(crate) fn distinct(names: &[String]) -> Vec<&str> {
    let mut seen = Vec::with_capacity(names.len());
    for name in names {
        if !seen.contains(&name.as_str()) {
            seen.push(name.as_str());
        }
    }
    seen
}
