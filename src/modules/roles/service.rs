use tracing::instrument;

use rolegate_core::{AppError, PaginationParams};
use rolegate_db::CredentialStore;
use rolegate_models::{CreateRoleDto, Role, UpdateRoleDto};

pub struct RoleService;

impl RoleService {
    #[instrument(skip(store))]
    pub async fn create_role(
        store: &dyn CredentialStore,
        dto: CreateRoleDto,
    ) -> Result<Role, AppError> {
        Ok(store.create_role(&dto.name, &dto.permissions).await?)
    }

    #[instrument(skip(store))]
    pub async fn get_roles(
        store: &dyn CredentialStore,
        params: &PaginationParams,
    ) -> Result<Vec<Role>, AppError> {
        Ok(store.list_roles(params.limit(), params.offset()).await?)
    }

    #[instrument(skip(store))]
    pub async fn get_role(store: &dyn CredentialStore, id: i64) -> Result<Role, AppError> {
        Ok(store.get_role(id).await?)
    }

    /// Renames the role and, when `permissions` is given, replaces its grants.
    #[instrument(skip(store))]
    pub async fn update_role(
        store: &dyn CredentialStore,
        id: i64,
        dto: UpdateRoleDto,
    ) -> Result<Role, AppError> {
        Ok(store
            .update_role(id, &dto.name, dto.permissions.as_deref())
            .await?)
    }

    /// Deleting a role also unassigns it from every user.
    #[instrument(skip(store))]
    pub async fn delete_role(store: &dyn CredentialStore, id: i64) -> Result<(), AppError> {
        Ok(store.delete_role(id).await?)
    }
}
