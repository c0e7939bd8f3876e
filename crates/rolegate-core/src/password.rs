//! Password hashing.
//!
//! Passwords are stored as bcrypt digests. bcrypt embeds a random per-call salt
//! and the cost factor in its output, so a digest is self-describing and
//! [`verify_password`] needs nothing but the stored string.

use bcrypt::{hash, verify};

use crate::errors::AppError;

/// bcrypt work factor used for every new digest.
pub const HASH_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` on mismatch and an error when `digest` is not a bcrypt hash.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AppError> {
    verify(password, digest)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let digest = hash_password("secret1").unwrap();

        assert_ne!(digest, "secret1");
        assert!(verify_password("secret1", &digest).unwrap());
        assert!(!verify_password("secret2", &digest).unwrap());
    }

    #[test]
    fn test_digest_embeds_cost() {
        let digest = hash_password("secret1").unwrap();
        assert!(digest.starts_with("$2b$10$"));
    }

    #[test]
    fn test_salt_differs_per_call() {
        let first = hash_password("samepassword").unwrap();
        let second = hash_password("samepassword").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("samepassword", &first).unwrap());
        assert!(verify_password("samepassword", &second).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        assert!(verify_password("secret1", "not_a_valid_bcrypt_hash").is_err());
        assert!(verify_password("secret1", "").is_err());
    }

    #[test]
    fn test_unicode_password() {
        let digest = hash_password("пароль密码🔒").unwrap();
        assert!(verify_password("пароль密码🔒", &digest).unwrap());
    }
}
