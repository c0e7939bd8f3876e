use tracing::{instrument, warn};

use rolegate_auth::{TokenError, TokenPair, TokenService};
use rolegate_core::{AppError, verify_password};
use rolegate_db::{CredentialStore, StoreError};
use rolegate_models::{LoginRequest, LoginResponse, User};

use crate::modules::permissions::service::PermissionResolver;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthService;

impl AuthService {
    /// Checks the password and issues a token pair carrying the user's current roles.
    #[instrument(skip(store, resolver, tokens, dto), fields(username = %dto.username))]
    pub async fn login(
        store: &dyn CredentialStore,
        resolver: &PermissionResolver,
        tokens: &TokenService,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let Some(credentials) = store.find_credentials(&dto.username).await? else {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        let digest = credentials.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&dto.password, &digest))
            .await
            .map_err(AppError::internal)?;

        match verified {
            Ok(true) => {}
            Ok(false) => return Err(AppError::unauthorized(INVALID_CREDENTIALS)),
            Err(e) => {
                warn!(user_id = credentials.id, error = %e, "Stored password hash is unreadable");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        }

        let roles = resolver.roles_of(credentials.id).await?;
        let pair = tokens.issue(credentials.id, &credentials.username, &roles)?;

        Ok(LoginResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: User {
                id: credentials.id,
                username: credentials.username,
                roles,
            },
        })
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// Username and roles are read from the store again, so the new access token
    /// reflects assignments made since the last login.
    #[instrument(skip_all)]
    pub async fn refresh(
        store: &dyn CredentialStore,
        tokens: &TokenService,
        refresh_token: &str,
    ) -> Result<TokenPair, AppError> {
        let claims = tokens.validate_refresh(refresh_token)?;
        let user_id = claims.user_id().ok_or(TokenError::Invalid)?;

        let user = match store.get_user(user_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => {
                warn!(user_id, "Refresh token subject no longer exists");
                return Err(TokenError::Invalid.into());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(tokens.issue(user.id, &user.username, &user.roles)?)
    }
}
