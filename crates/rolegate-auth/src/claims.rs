//! JWT claim structures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Discriminates access from refresh tokens, which share a signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in an access token.
///
/// `roles` is a snapshot taken at issuance; later role changes are not
/// reflected until the token is refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessClaims {
    /// User id as a decimal string (subject claim)
    pub sub: String,
    pub username: String,
    /// Role names in assignment order
    pub roles: Vec<String>,
    /// Issued-at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds)
    pub exp: i64,
    pub typ: TokenKind,
}

impl AccessClaims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Claims embedded in a refresh token. Carries no username or roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id, so two tokens minted in the same second differ
    pub jti: String,
    pub typ: TokenKind,
}

impl RefreshClaims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_serialize() {
        let claims = AccessClaims {
            sub: "7".to_string(),
            username: "alice".to_string(),
            roles: vec!["editor".to_string()],
            iat: 1_700_000_000,
            exp: 1_700_086_400,
            typ: TokenKind::Access,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"7""#));
        assert!(serialized.contains(r#""roles":["editor"]"#));
        assert!(serialized.contains(r#""typ":"access""#));
    }

    #[test]
    fn test_refresh_claims_have_no_identity_snapshot() {
        let json = r#"{"sub":"7","iat":1,"exp":2,"jti":"abc","typ":"refresh"}"#;
        let claims: RefreshClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.typ, TokenKind::Refresh);

        // A refresh payload cannot be read as access claims.
        assert!(serde_json::from_str::<AccessClaims>(json).is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = AccessClaims {
            sub: "not-a-number".to_string(),
            username: "alice".to_string(),
            roles: vec![],
            iat: 0,
            exp: 0,
            typ: TokenKind::Access,
        };
        assert_eq!(claims.user_id(), None);
    }
}
