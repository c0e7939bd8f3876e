//! # rolegate DB
//!
//! The credential store: users, roles, permissions and the user↔role and
//! role↔permission links between them.
//!
//! - [`store`]: the [`CredentialStore`] contract and [`StoreError`]
//! - [`postgres`]: [`PgCredentialStore`], backed by PostgreSQL through sqlx
//! - [`memory`]: [`MemoryCredentialStore`], an in-process implementation
//!
//! Every multi-row write runs as one unit: either all link rows are written or
//! none are.
//!
//! # Example
//!
//! ```ignore
//! use rolegate_config::DatabaseConfig;
//! use rolegate_db::{PgCredentialStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! let store = PgCredentialStore::new(pool);
//! ```

pub mod memory;
pub mod postgres;
pub mod store;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use rolegate_config::DatabaseConfig;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
pub use store::{CredentialStore, StoreError, StoreResult};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Opens a PostgreSQL connection pool.
pub async fn init_db_pool(config: &DatabaseConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies the migrations embedded from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
