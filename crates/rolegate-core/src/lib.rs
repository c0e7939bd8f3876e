//! # rolegate Core
//!
//! Core types, errors, and utilities shared by every rolegate crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: `page`/`limit` query parameters for list endpoints
//! - [`password`]: Salted bcrypt hashing and verification
//! - [`permissions`]: Names of the seeded permissions
//!
//! # Example
//!
//! ```ignore
//! use rolegate_core::{AppError, hash_password, verify_password};
//!
//! let hash = hash_password("secret1")?;
//! assert!(verify_password("secret1", &hash)?);
//!
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::PaginationParams;
pub use password::{hash_password, verify_password};
