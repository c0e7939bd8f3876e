//! Permission resolution: user → roles → permissions.

use std::sync::Arc;

use tracing::instrument;

use rolegate_db::{CredentialStore, StoreResult};

/// Answers permission questions against current store state.
///
/// Nothing is cached. A `false` answer means no grant exists; an `Err` means the
/// answer is unknown and callers must deny.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn CredentialStore>,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// True iff some role assigned to the user grants `permission`.
    #[instrument(skip(self))]
    pub async fn has_permission(&self, user_id: i64, permission: &str) -> StoreResult<bool> {
        self.store.has_permission(user_id, permission).await
    }

    /// Role names in assignment order, as embedded in access tokens.
    pub async fn roles_of(&self, user_id: i64) -> StoreResult<Vec<String>> {
        self.store.roles_of(user_id).await
    }

    pub async fn effective_permissions(&self, user_id: i64) -> StoreResult<Vec<String>> {
        self.store.effective_permissions(user_id).await
    }
}
