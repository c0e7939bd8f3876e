use crate::{ConfigError, env_lookup, non_empty, parse_or};

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Apply embedded migrations on startup.
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Uses `DATABASE_URL` when present, otherwise assembles a PostgreSQL URL
    /// from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match non_empty(&lookup, "DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = non_empty(&lookup, "DB_HOST").ok_or(ConfigError::Missing("DB_HOST"))?;
                let port: u16 = parse_or(&lookup, "DB_PORT", 5432)?;
                let user = non_empty(&lookup, "DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
                let name = non_empty(&lookup, "DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
                match non_empty(&lookup, "DB_PASSWORD") {
                    Some(password) => {
                        format!("postgres://{user}:{password}@{host}:{port}/{name}")
                    }
                    None => format!("postgres://{user}@{host}:{port}/{name}"),
                }
            }
        };

        Ok(Self {
            url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_or(&lookup, "DB_RUN_MIGRATIONS", true)?,
        })
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}
