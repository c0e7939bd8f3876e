use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use rolegate_auth::TokenService;
use rolegate_config::{CorsConfig, DatabaseConfig, JwtConfig};
use rolegate_db::{CredentialStore, PgCredentialStore, init_db_pool, run_migrations};

use crate::modules::permissions::service::PermissionResolver;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub tokens: TokenService,
    pub permissions: PermissionResolver,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService, cors_config: CorsConfig) -> Self {
        Self {
            permissions: PermissionResolver::new(store.clone()),
            store,
            tokens,
            cors_config,
        }
    }
}

/// Loads configuration, connects to PostgreSQL and applies migrations.
///
/// Fails when `JWT_SECRET` is unset: the service never signs with an empty key.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env().context("invalid JWT configuration")?;
    let tokens = TokenService::new(&jwt_config).context("failed to initialize token service")?;

    let db_config = DatabaseConfig::from_env().context("invalid database configuration")?;
    let pool = init_db_pool(&db_config)
        .await
        .context("failed to connect to database")?;

    if db_config.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    } else {
        info!("Skipping migrations (DB_RUN_MIGRATIONS=false)");
    }

    Ok(AppState::new(
        Arc::new(PgCredentialStore::new(pool)),
        tokens,
        CorsConfig::from_env(),
    ))
}
