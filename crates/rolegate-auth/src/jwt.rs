//! Token issuance and validation.
//!
//! Both token kinds are signed with HS256 under the one secret from
//! [`JwtConfig`]. Verification pins HS256, so tokens declaring `none` or any
//! other algorithm are rejected before the signature is looked at.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use rolegate_config::JwtConfig;
use rolegate_core::AppError;

use crate::claims::{AccessClaims, RefreshClaims, TokenKind};

const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    MissingSecret,
    #[error("token is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            // Clients never learn which of the two it was.
            TokenError::Invalid | TokenError::Expired => {
                AppError::unauthorized(INVALID_TOKEN_MESSAGE)
            }
            TokenError::MissingSecret | TokenError::Signing(_) => AppError::internal(err),
        }
    }
}

/// An access/refresh token pair as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        if config.secret.trim().is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
        })
    }

    pub fn issue(
        &self,
        user_id: i64,
        username: &str,
        roles: &[String],
    ) -> Result<TokenPair, TokenError> {
        self.issue_at(user_id, username, roles, Utc::now())
    }

    /// Issues a pair as if the current time were `now`.
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        roles: &[String],
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let iat = now.timestamp();

        let access = AccessClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            roles: roles.to_vec(),
            iat,
            exp: iat.saturating_add(self.access_token_expiry),
            typ: TokenKind::Access,
        };

        let refresh = RefreshClaims {
            sub: user_id.to_string(),
            iat,
            exp: iat.saturating_add(self.refresh_token_expiry),
            jti: Uuid::new_v4().to_string(),
            typ: TokenKind::Refresh,
        };

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        })
    }

    /// Validates an access token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = self.verify(token)?;
        if claims.typ != TokenKind::Access || claims.user_id().is_none() {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    /// Validates a refresh token and returns its claims.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = self.verify(token)?;
        if claims.typ != TokenKind::Refresh || claims.user_id().is_none() {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("rejected expired token");
                    TokenError::Expired
                }
                kind => {
                    tracing::debug!(reason = ?kind, "rejected invalid token");
                    TokenError::Invalid
                }
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry: 86_400,
            refresh_token_expiry: 604_800,
        }
    }

    fn service() -> TokenService {
        TokenService::new(&config("test_secret_key")).unwrap()
    }

    fn roles() -> Vec<String> {
        vec!["editor".to_string(), "viewer".to_string()]
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            TokenService::new(&config("")),
            Err(TokenError::MissingSecret)
        ));
        assert!(matches!(
            TokenService::new(&config("  ")),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let tokens = service();
        let pair = tokens.issue(42, "alice", &roles()).unwrap();

        let claims = tokens.validate(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, roles());
        assert_eq!(claims.exp - claims.iat, 86_400);
        assert_eq!(claims.typ, TokenKind::Access);
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let tokens = service();
        let pair = tokens.issue(42, "alice", &roles()).unwrap();

        let access = tokens.validate(&pair.access_token).unwrap();
        let refresh = tokens.validate_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, "42");
        assert_eq!(refresh.exp - refresh.iat, 604_800);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_oversized_expiry_does_not_overflow() {
        let tokens = TokenService::new(&JwtConfig {
            secret: "test_secret_key".to_string(),
            access_token_expiry: i64::MAX,
            refresh_token_expiry: i64::MAX,
        })
        .unwrap();

        assert!(tokens.issue(42, "alice", &roles()).is_ok());
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let tokens = service();
        let now = Utc::now();
        let first = tokens.issue_at(1, "alice", &[], now).unwrap();
        let second = tokens.issue_at(1, "alice", &[], now).unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_expired_access_token() {
        let tokens = service();
        let issued = Utc::now() - Duration::hours(25);
        let pair = tokens.issue_at(42, "alice", &roles(), issued).unwrap();

        assert!(matches!(
            tokens.validate(&pair.access_token),
            Err(TokenError::Expired)
        ));
        // The refresh token from the same pair is still within its lifetime.
        assert!(tokens.validate_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_expired_refresh_token() {
        let tokens = service();
        let issued = Utc::now() - Duration::days(8);
        let pair = tokens.issue_at(42, "alice", &[], issued).unwrap();

        assert!(matches!(
            tokens.validate_refresh(&pair.refresh_token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let pair = TokenService::new(&config("secret1"))
            .unwrap()
            .issue(42, "alice", &roles())
            .unwrap();

        let other = TokenService::new(&config("secret2")).unwrap();
        assert!(matches!(
            other.validate(&pair.access_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_tampered_payload() {
        let tokens = service();
        let pair = tokens.issue(42, "alice", &roles()).unwrap();

        let mut parts: Vec<String> = pair.access_token.split('.').map(String::from).collect();
        let mut payload = parts[1].clone().into_bytes();
        payload[4] = if payload[4] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        assert!(matches!(tokens.validate(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_malformed_token() {
        let tokens = service();
        assert!(matches!(tokens.validate("not.a.token"), Err(TokenError::Invalid)));
        assert!(matches!(tokens.validate(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_none_algorithm_is_rejected() {
        let tokens = service();
        let pair = tokens.issue(42, "alice", &roles()).unwrap();
        let payload = pair.access_token.split('.').nth(1).unwrap();

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{payload}.");
        assert!(matches!(tokens.validate(&unsigned), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_other_hmac_algorithm_is_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: "42".to_string(),
            username: "alice".to_string(),
            roles: roles(),
            iat: now,
            exp: now + 3600,
            typ: TokenKind::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key"),
        )
        .unwrap();

        assert!(matches!(tokens.validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let tokens = service();
        let pair = tokens.issue(42, "alice", &roles()).unwrap();

        assert!(matches!(
            tokens.validate(&pair.refresh_token),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            tokens.validate_refresh(&pair.access_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_error_mapping_hides_reason() {
        let expired: AppError = TokenError::Expired.into();
        let invalid: AppError = TokenError::Invalid.into();
        assert_eq!(expired.status.as_u16(), 401);
        assert_eq!(expired.public_message(), invalid.public_message());
        assert_eq!(invalid.public_message(), "Invalid or expired token");

        let missing: AppError = TokenError::MissingSecret.into();
        assert!(missing.is_server_error());
    }
}
