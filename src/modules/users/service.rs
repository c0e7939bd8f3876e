use tracing::instrument;

use rolegate_core::{AppError, PaginationParams, hash_password};
use rolegate_db::CredentialStore;
use rolegate_models::{CreateUserDto, UpdateUserDto, User, UserPermissionsResponse};

use crate::modules::permissions::service::PermissionResolver;

pub struct UserService;

impl UserService {
    /// Hashes the password off the async runtime, then inserts the user and
    /// its role links in one store call.
    #[instrument(skip(store, dto), fields(username = %dto.username))]
    pub async fn create_user(
        store: &dyn CredentialStore,
        dto: CreateUserDto,
    ) -> Result<User, AppError> {
        let password = dto.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(AppError::internal)??;

        let user = store
            .create_user(&dto.username, &password_hash, &dto.roles)
            .await?;
        Ok(user)
    }

    #[instrument(skip(store))]
    pub async fn get_users(
        store: &dyn CredentialStore,
        params: &PaginationParams,
    ) -> Result<Vec<User>, AppError> {
        Ok(store.list_users(params.limit(), params.offset()).await?)
    }

    #[instrument(skip(store))]
    pub async fn get_user(store: &dyn CredentialStore, id: i64) -> Result<User, AppError> {
        Ok(store.get_user(id).await?)
    }

    #[instrument(skip(store, dto))]
    pub async fn update_user(
        store: &dyn CredentialStore,
        id: i64,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        Ok(store
            .update_user(id, &dto.username, dto.roles.as_deref())
            .await?)
    }

    #[instrument(skip(store))]
    pub async fn delete_user(store: &dyn CredentialStore, id: i64) -> Result<(), AppError> {
        Ok(store.delete_user(id).await?)
    }

    /// Effective permission set of an existing user.
    #[instrument(skip(store, resolver))]
    pub async fn get_user_permissions(
        store: &dyn CredentialStore,
        resolver: &PermissionResolver,
        id: i64,
    ) -> Result<UserPermissionsResponse, AppError> {
        let user = store.get_user(id).await?;
        let permissions = resolver.effective_permissions(user.id).await?;
        Ok(UserPermissionsResponse {
            user_id: user.id,
            permissions,
        })
    }
}
