//! In-process credential store.
//!
//! All state sits behind one `tokio::sync::RwLock`. Writes resolve every name
//! before touching anything, so a failed call leaves the state unchanged.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rolegate_core::permissions;
use rolegate_models::{Permission, Role, User, UserCredentials};

use crate::store::{CredentialStore, StoreError, StoreResult, distinct};

#[derive(Debug, Clone)]
struct UserRecord {
    username: String,
    password_hash: String,
    /// Role ids in assignment order
    roles: Vec<i64>,
}

#[derive(Debug, Clone)]
struct RoleRecord {
    name: String,
    /// Permission ids in grant order
    permissions: Vec<i64>,
}

#[derive(Debug, Default)]
struct State {
    next_user_id: i64,
    next_role_id: i64,
    users: BTreeMap<i64, UserRecord>,
    roles: BTreeMap<i64, RoleRecord>,
    permissions: BTreeMap<i64, Permission>,
}

impl State {
    fn user(&self, id: i64, record: &UserRecord) -> User {
        User {
            id,
            username: record.username.clone(),
            roles: record
                .roles
                .iter()
                .filter_map(|role_id| self.roles.get(role_id))
                .map(|role| role.name.clone())
                .collect(),
        }
    }

    fn role(&self, id: i64, record: &RoleRecord) -> Role {
        Role {
            id,
            name: record.name.clone(),
            permissions: self.permission_names(&record.permissions),
        }
    }

    fn permission_names(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.permissions.get(id))
            .map(|p| p.name.clone())
            .collect()
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|(id, u)| u.username == username && Some(*id) != except)
    }

    fn role_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.roles
            .iter()
            .any(|(id, r)| r.name == name && Some(*id) != except)
    }

    fn resolve_roles(&self, names: &[String]) -> StoreResult<Vec<i64>> {
        distinct(names)
            .into_iter()
            .map(|name| {
                self.roles
                    .iter()
                    .find(|(_, r)| r.name == name)
                    .map(|(id, _)| *id)
                    .ok_or_else(|| StoreError::InvalidRole(name.to_string()))
            })
            .collect()
    }

    fn resolve_permissions(&self, names: &[String]) -> StoreResult<Vec<i64>> {
        distinct(names)
            .into_iter()
            .map(|name| {
                self.permissions
                    .values()
                    .find(|p| p.name == name)
                    .map(|p| p.id)
                    .ok_or_else(|| StoreError::InvalidPermission(name.to_string()))
            })
            .collect()
    }
}

pub struct MemoryCredentialStore {
    state: RwLock<State>,
}

impl MemoryCredentialStore {
    /// A store whose permission catalogue matches the database seed.
    pub fn new() -> Self {
        Self::with_permissions(permissions::ALL.iter().copied())
    }

    pub fn with_permissions<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let permissions = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let id = i as i64 + 1;
                let permission = Permission {
                    id,
                    name: name.into(),
                    description: None,
                };
                (id, permission)
            })
            .collect();

        Self {
            state: RwLock::new(State {
                permissions,
                ..State::default()
            }),
        }
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[String],
    ) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.username_taken(username, None) {
            return Err(StoreError::duplicate_username());
        }
        let role_ids = state.resolve_roles(roles)?;

        state.next_user_id += 1;
        let id = state.next_user_id;
        let record = UserRecord {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            roles: role_ids,
        };
        let user = state.user(id, &record);
        state.users.insert(id, record);

        Ok(user)
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|(_, u)| u.username == username)
            .map(|(id, u)| UserCredentials {
                id: *id,
                username: u.username.clone(),
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        let state = self.state.read().await;
        state
            .users
            .get(&id)
            .map(|record| state.user(id, record))
            .ok_or_else(StoreError::user_not_found)
    }

    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|(id, record)| state.user(*id, record))
            .collect())
    }

    async fn update_user(
        &self,
        id: i64,
        username: &str,
        roles: Option<&[String]>,
    ) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&id) {
            return Err(StoreError::user_not_found());
        }
        if state.username_taken(username, Some(id)) {
            return Err(StoreError::duplicate_username());
        }
        let role_ids = roles.map(|names| state.resolve_roles(names)).transpose()?;

        let mut record = state.users[&id].clone();
        record.username = username.to_string();
        if let Some(role_ids) = role_ids {
            record.roles = role_ids;
        }
        let user = state.user(id, &record);
        state.users.insert(id, record);

        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(StoreError::user_not_found)
    }

    async fn create_role(&self, name: &str, permissions: &[String]) -> StoreResult<Role> {
        let mut state = self.state.write().await;

        if state.role_name_taken(name, None) {
            return Err(StoreError::duplicate_role_name());
        }
        let permission_ids = state.resolve_permissions(permissions)?;

        state.next_role_id += 1;
        let id = state.next_role_id;
        let record = RoleRecord {
            name: name.to_string(),
            permissions: permission_ids,
        };
        let role = state.role(id, &record);
        state.roles.insert(id, record);

        Ok(role)
    }

    async fn get_role(&self, id: i64) -> StoreResult<Role> {
        let state = self.state.read().await;
        state
            .roles
            .get(&id)
            .map(|record| state.role(id, record))
            .ok_or_else(StoreError::role_not_found)
    }

    async fn list_roles(&self, limit: i64, offset: i64) -> StoreResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|(id, record)| state.role(*id, record))
            .collect())
    }

    async fn update_role(
        &self,
        id: i64,
        name: &str,
        permissions: Option<&[String]>,
    ) -> StoreResult<Role> {
        let mut state = self.state.write().await;

        if !state.roles.contains_key(&id) {
            return Err(StoreError::role_not_found());
        }
        if state.role_name_taken(name, Some(id)) {
            return Err(StoreError::duplicate_role_name());
        }
        let permission_ids = permissions
            .map(|names| state.resolve_permissions(names))
            .transpose()?;

        let mut record = state.roles[&id].clone();
        record.name = name.to_string();
        if let Some(permission_ids) = permission_ids {
            record.permissions = permission_ids;
        }
        let role = state.role(id, &record);
        state.roles.insert(id, record);

        Ok(role)
    }

    async fn delete_role(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;

        if state.roles.remove(&id).is_none() {
            return Err(StoreError::role_not_found());
        }
        for user in state.users.values_mut() {
            user.roles.retain(|role_id| *role_id != id);
        }

        Ok(())
    }

    async fn roles_of(&self, user_id: i64) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&user_id)
            .map(|record| state.user(user_id, record).roles)
            .unwrap_or_default())
    }

    async fn permissions_of(&self, role_id: i64) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .get(&role_id)
            .map(|record| state.permission_names(&record.permissions))
            .unwrap_or_default())
    }

    async fn effective_permissions(&self, user_id: i64) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        let Some(user) = state.users.get(&user_id) else {
            return Ok(Vec::new());
        };

        let mut names: Vec<String> = user
            .roles
            .iter()
            .filter_map(|role_id| state.roles.get(role_id))
            .flat_map(|role| state.permission_names(&role.permissions))
            .collect();
        names.sort();
        names.dedup();

        Ok(names)
    }

    async fn has_permission(&self, user_id: i64, permission: &str) -> StoreResult<bool> {
        let state = self.state.read().await;
        let Some(user) = state.users.get(&user_id) else {
            return Ok(false);
        };

        Ok(user
            .roles
            .iter()
            .filter_map(|role_id| state.roles.get(role_id))
            .flat_map(|role| role.permissions.iter())
            .filter_map(|id| state.permissions.get(id))
            .any(|p| p.name == permission))
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        let state = self.state.read().await;
        Ok(state.permissions.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    async fn store_with_editor() -> (MemoryCredentialStore, Role) {
        let store = MemoryCredentialStore::new();
        let editor = store
            .create_role("editor", &names(&["view_post", "edit_post"]))
            .await
            .unwrap();
        (store, editor)
    }

    #[tokio::test]
    async fn test_create_user_resolves_roles() {
        let (store, _) = store_with_editor().await;
        let user = store
            .create_user("alice", "hash", &names(&["editor"]))
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.roles, names(&["editor"]));
        assert_eq!(store.get_user(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_unknown_role_persists_nothing() {
        let (store, _) = store_with_editor().await;
        let err = store
            .create_user("alice", "hash", &names(&["editor", "ghost"]))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidRole(ref name) if name == "ghost"));
        assert!(store.find_credentials("alice").await.unwrap().is_none());
        assert!(store.list_users(10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_conflict() {
        let (store, _) = store_with_editor().await;
        store.create_user("alice", "hash", &[]).await.unwrap();

        assert!(matches!(
            store.create_user("alice", "other", &[]).await,
            Err(StoreError::Conflict(_))
        ));
        assert!(matches!(
            store.create_role("editor", &[]).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_roles_keep_assignment_order_without_duplicates() {
        let store = MemoryCredentialStore::new();
        store.create_role("zeta", &[]).await.unwrap();
        store.create_role("alpha", &[]).await.unwrap();

        let user = store
            .create_user("alice", "hash", &names(&["zeta", "alpha", "zeta"]))
            .await
            .unwrap();
        assert_eq!(store.roles_of(user.id).await.unwrap(), names(&["zeta", "alpha"]));
    }

    #[tokio::test]
    async fn test_has_permission() {
        let (store, _) = store_with_editor().await;
        store.create_role("empty", &[]).await.unwrap();
        let alice = store
            .create_user("alice", "hash", &names(&["editor"]))
            .await
            .unwrap();
        let bob = store.create_user("bob", "hash", &[]).await.unwrap();
        let carol = store
            .create_user("carol", "hash", &names(&["empty"]))
            .await
            .unwrap();

        assert!(store.has_permission(alice.id, "view_post").await.unwrap());
        assert!(!store.has_permission(alice.id, "delete_post").await.unwrap());
        assert!(!store.has_permission(alice.id, "no_such").await.unwrap());
        assert!(!store.has_permission(bob.id, "view_post").await.unwrap());
        assert!(!store.has_permission(carol.id, "view_post").await.unwrap());
        assert!(!store.has_permission(999, "view_post").await.unwrap());
    }

    #[tokio::test]
    async fn test_effective_permissions_union() {
        let (store, _) = store_with_editor().await;
        store
            .create_role("moderator", &names(&["delete_post", "view_post"]))
            .await
            .unwrap();
        let user = store
            .create_user("alice", "hash", &names(&["editor", "moderator"]))
            .await
            .unwrap();

        assert_eq!(
            store.effective_permissions(user.id).await.unwrap(),
            names(&["delete_post", "edit_post", "view_post"])
        );
        assert!(store.effective_permissions(999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_role_revokes_grants() {
        let (store, editor) = store_with_editor().await;
        let user = store
            .create_user("alice", "hash", &names(&["editor"]))
            .await
            .unwrap();

        store.delete_role(editor.id).await.unwrap();

        assert!(!store.has_permission(user.id, "view_post").await.unwrap());
        assert!(store.roles_of(user.id).await.unwrap().is_empty());
        assert!(store.permissions_of(editor.id).await.unwrap().is_empty());
        assert!(matches!(
            store.get_role(editor.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_user_replaces_roles_atomically() {
        let (store, _) = store_with_editor().await;
        store.create_role("viewer", &names(&["view_post"])).await.unwrap();
        let user = store
            .create_user("alice", "hash", &names(&["editor"]))
            .await
            .unwrap();

        let err = store
            .update_user(user.id, "alicia", Some(&names(&["viewer", "ghost"])))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRole(_)));
        let unchanged = store.get_user(user.id).await.unwrap();
        assert_eq!(unchanged.username, "alice");
        assert_eq!(unchanged.roles, names(&["editor"]));

        let renamed = store.update_user(user.id, "alicia", None).await.unwrap();
        assert_eq!(renamed.roles, names(&["editor"]));

        let updated = store
            .update_user(user.id, "alicia", Some(&names(&["viewer"])))
            .await
            .unwrap();
        assert_eq!(updated.roles, names(&["viewer"]));
    }

    #[tokio::test]
    async fn test_missing_entities() {
        let store = MemoryCredentialStore::new();
        assert!(matches!(store.get_user(1).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_user(1).await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.update_role(1, "x", None).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete_role(1).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_permission_rejected() {
        let store = MemoryCredentialStore::new();
        let err = store
            .create_role("flyer", &names(&["fly"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPermission(ref name) if name == "fly"));
        assert!(store.list_roles(10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pagination() {
        let store = MemoryCredentialStore::new();
        for name in ["a", "b", "c"] {
            store.create_user(name, "hash", &[]).await.unwrap();
        }

        let page: Vec<String> = store
            .list_users(2, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(page, names(&["b", "c"]));
    }

    #[tokio::test]
    async fn test_catalogue_matches_seed() {
        let store = MemoryCredentialStore::new();
        let catalogue: Vec<String> = store
            .list_permissions()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(catalogue, names(permissions::ALL));
    }
}
