//! # rolegate Auth
//!
//! The token service: issues and validates the HMAC-SHA256 signed access and
//! refresh tokens that make up a stateless session.
//!
//! - [`claims`]: payloads carried by each token kind
//! - [`jwt`]: [`TokenService`] and [`TokenError`]
//!
//! # Token Types
//!
//! - **Access token** ([`AccessClaims`]): user id, username and role names as
//!   they were at issuance. Presented as `Authorization: Bearer <token>`.
//! - **Refresh token** ([`RefreshClaims`]): subject only. It can mint a new pair
//!   and nothing else, so the caller re-reads username and roles before issuing.
//!
//! There is no revocation: a token is valid until its `exp` passes.
//!
//! # Example
//!
//! ```ignore
//! use rolegate_auth::TokenService;
//! use rolegate_config::JwtConfig;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env()?)?;
//! let pair = tokens.issue(42, "alice", &["editor".to_string()])?;
//! let claims = tokens.validate(&pair.access_token)?;
//! assert_eq!(claims.username, "alice");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{AccessClaims, RefreshClaims, TokenKind};
pub use jwt::{TokenError, TokenPair, TokenService};
