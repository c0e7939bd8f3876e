//! PostgreSQL credential store.
//!
//! Multi-statement writes run inside `pool.begin()` transactions. Returning
//! early with `?` drops the transaction, which rolls it back.

use async_trait::async_trait;
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::instrument;

use rolegate_models::{Permission, Role, User, UserCredentials};

use crate::store::{CredentialStore, StoreError, StoreResult, distinct};

const SELECT_USER: &str = r#"
    SELECT u.id, u.username,
           COALESCE(
               array_agg(r.name ORDER BY ur.id) FILTER (WHERE r.name IS NOT NULL),
               ARRAY[]::VARCHAR[]
           ) AS roles
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

const SELECT_ROLE: &str = r#"
    SELECT r.id, r.name,
           COALESCE(
               array_agg(p.name ORDER BY rp.id) FILTER (WHERE p.name IS NOT NULL),
               ARRAY[]::VARCHAR[]
           ) AS permissions
    FROM roles r
    LEFT JOIN role_permissions rp ON rp.role_id = r.id
    LEFT JOIN permissions p ON p.id = rp.permission_id
"#;

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn on_unique_violation(err: sqlx::Error, conflict: fn() -> StoreError) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => conflict(),
        _ => StoreError::Database(err),
    }
}

async fn fetch_user<'e, E>(executor: E, id: i64) -> StoreResult<Option<User>>
where
    E: PgExecutor<'e>,
{
    let query = format!("{SELECT_USER} WHERE u.id = $1 GROUP BY u.id");
    let user = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(user)
}

async fn fetch_role<'e, E>(executor: E, id: i64) -> StoreResult<Option<Role>>
where
    E: PgExecutor<'e>,
{
    let query = format!("{SELECT_ROLE} WHERE r.id = $1 GROUP BY r.id");
    let role = sqlx::query_as::<_, Role>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(role)
}

async fn assign_roles(conn: &mut PgConnection, user_id: i64, roles: &[String]) -> StoreResult<()> {
    for name in distinct(roles) {
        let role_id: Option<i64> = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        let role_id = role_id.ok_or_else(|| StoreError::InvalidRole(name.to_string()))?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn grant_permissions(
    conn: &mut PgConnection,
    role_id: i64,
    permissions: &[String],
) -> StoreResult<()> {
    for name in distinct(permissions) {
        let permission_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM permissions WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut *conn)
                .await?;
        let permission_id =
            permission_id.ok_or_else(|| StoreError::InvalidPermission(name.to_string()))?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)
             ON CONFLICT (role_id, permission_id) DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    #[instrument(skip(self, password_hash))]
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[String],
    ) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| on_unique_violation(e, StoreError::duplicate_username))?;

        assign_roles(&mut tx, id, roles).await?;

        let user = fetch_user(&mut *tx, id)
            .await?
            .ok_or_else(StoreError::user_not_found)?;
        tx.commit().await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_credentials(&self, username: &str) -> StoreResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: i64) -> StoreResult<User> {
        fetch_user(&self.pool, id)
            .await?
            .ok_or_else(StoreError::user_not_found)
    }

    #[instrument(skip(self))]
    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<Vec<User>> {
        let query = format!("{SELECT_USER} GROUP BY u.id ORDER BY u.id LIMIT $1 OFFSET $2");
        let users = sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn update_user(
        &self,
        id: i64,
        username: &str,
        roles: Option<&[String]>,
    ) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE users SET username = $1, updated_at = NOW() WHERE id = $2")
            .bind(username)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| on_unique_violation(e, StoreError::duplicate_username))?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::user_not_found());
        }

        if let Some(roles) = roles {
            sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            assign_roles(&mut tx, id, roles).await?;
        }

        let user = fetch_user(&mut *tx, id)
            .await?
            .ok_or_else(StoreError::user_not_found)?;
        tx.commit().await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::user_not_found());
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_role(&self, name: &str, permissions: &[String]) -> StoreResult<Role> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar("INSERT INTO roles (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| on_unique_violation(e, StoreError::duplicate_role_name))?;

        grant_permissions(&mut tx, id, permissions).await?;

        let role = fetch_role(&mut *tx, id)
            .await?
            .ok_or_else(StoreError::role_not_found)?;
        tx.commit().await?;

        Ok(role)
    }

    #[instrument(skip(self))]
    async fn get_role(&self, id: i64) -> StoreResult<Role> {
        fetch_role(&self.pool, id)
            .await?
            .ok_or_else(StoreError::role_not_found)
    }

    #[instrument(skip(self))]
    async fn list_roles(&self, limit: i64, offset: i64) -> StoreResult<Vec<Role>> {
        let query = format!("{SELECT_ROLE} GROUP BY r.id ORDER BY r.id LIMIT $1 OFFSET $2");
        let roles = sqlx::query_as::<_, Role>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    #[instrument(skip(self))]
    async fn update_role(
        &self,
        id: i64,
        name: &str,
        permissions: Option<&[String]>,
    ) -> StoreResult<Role> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE roles SET name = $1, updated_at = NOW() WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| on_unique_violation(e, StoreError::duplicate_role_name))?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::role_not_found());
        }

        if let Some(permissions) = permissions {
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            grant_permissions(&mut tx, id, permissions).await?;
        }

        let role = fetch_role(&mut *tx, id)
            .await?
            .ok_or_else(StoreError::role_not_found)?;
        tx.commit().await?;

        Ok(role)
    }

    #[instrument(skip(self))]
    async fn delete_role(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_roles WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::role_not_found());
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn roles_of(&self, user_id: i64) -> StoreResult<Vec<String>> {
        let roles = sqlx::query_scalar(
            "SELECT r.name FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY ur.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    #[instrument(skip(self))]
    async fn permissions_of(&self, role_id: i64) -> StoreResult<Vec<String>> {
        let permissions = sqlx::query_scalar(
            "SELECT p.name FROM permissions p
             JOIN role_permissions rp ON rp.permission_id = p.id
             WHERE rp.role_id = $1
             ORDER BY rp.id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    #[instrument(skip(self))]
    async fn effective_permissions(&self, user_id: i64) -> StoreResult<Vec<String>> {
        let permissions = sqlx::query_scalar(
            "SELECT DISTINCT p.name FROM permissions p
             JOIN role_permissions rp ON rp.permission_id = p.id
             JOIN user_roles ur ON ur.role_id = rp.role_id
             WHERE ur.user_id = $1
             ORDER BY p.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    #[instrument(skip(self))]
    async fn has_permission(&self, user_id: i64, permission: &str) -> StoreResult<bool> {
        let granted: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM user_roles ur
                 JOIN role_permissions rp ON rp.role_id = ur.role_id
                 JOIN permissions p ON p.id = rp.permission_id
                 WHERE ur.user_id = $1 AND p.name = $2
             )",
        )
        .bind(user_id)
        .bind(permission)
        .fetch_one(&self.pool)
        .await?;
        Ok(granted)
    }

    #[instrument(skip(self))]
    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, name, description FROM permissions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }
}
