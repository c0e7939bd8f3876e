//! # rolegate Models
//!
//! Domain records and request/response DTOs shared by the store, the HTTP
//! handlers and the CLI.
//!
//! - [`auth`]: login and token refresh payloads
//! - [`roles`]: roles and the permission catalogue
//! - [`users`]: users and their credentials
//!
//! Roles and permissions are plain data referenced by name. Nothing here
//! enumerates them.

pub mod auth;
pub mod roles;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{LoginRequest, LoginResponse, MessageResponse};
pub use roles::{CreateRoleDto, Permission, Role, UpdateRoleDto};
pub use users::{CreateUserDto, UpdateUserDto, User, UserCredentials, UserPermissionsResponse};
