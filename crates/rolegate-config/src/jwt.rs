use crate::{ConfigError, env_lookup, non_empty, parse_or};

/// 24 hours.
pub const DEFAULT_ACCESS_EXPIRY: i64 = 86_400;
/// 7 days.
pub const DEFAULT_REFRESH_EXPIRY: i64 = 604_800;
/// Upper bound for either lifetime: 10 years.
pub const MAX_EXPIRY: i64 = 315_360_000;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    /// Loads `JWT_SECRET`, `JWT_ACCESS_EXPIRY` and `JWT_REFRESH_EXPIRY`.
    ///
    /// There is no fallback secret: without `JWT_SECRET` the service must not start.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = non_empty(&lookup, "JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let access_token_expiry = parse_or(&lookup, "JWT_ACCESS_EXPIRY", DEFAULT_ACCESS_EXPIRY)?;
        let refresh_token_expiry =
            parse_or(&lookup, "JWT_REFRESH_EXPIRY", DEFAULT_REFRESH_EXPIRY)?;

        if !(1..=MAX_EXPIRY).contains(&access_token_expiry) {
            return Err(ConfigError::Invalid {
                key: "JWT_ACCESS_EXPIRY",
                value: access_token_expiry.to_string(),
            });
        }
        if !(1..=MAX_EXPIRY).contains(&refresh_token_expiry) {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_EXPIRY",
                value: refresh_token_expiry.to_string(),
            });
        }

        Ok(Self {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

// Keeps the secret out of logs and panic messages.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}
