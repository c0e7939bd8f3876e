//! Names of the permissions seeded by the initial migration.
//!
//! Permissions are reference data: they live in the `permissions` table and
//! are never created through the API. These constants exist so route
//! declarations don't repeat string literals.

/// Read posts; required by `GET /api/protected`.
pub const VIEW_POST: &str = "view_post";
pub const CREATE_POST: &str = "create_post";
pub const EDIT_POST: &str = "edit_post";
pub const DELETE_POST: &str = "delete_post";
pub const MANAGE_USERS: &str = "manage_users";
pub const MANAGE_ROLES: &str = "manage_roles";

/// Every seeded permission, in seed order.
pub const ALL: &[&str] = &[
    VIEW_POST,
    CREATE_POST,
    EDIT_POST,
    DELETE_POST,
    MANAGE_USERS,
    MANAGE_ROLES,
];
