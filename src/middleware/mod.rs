pub mod auth;
pub mod permission;

pub use auth::{AuthUser, authenticate};
pub use permission::{PermissionGate, require_permission};
