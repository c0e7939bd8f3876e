pub mod auth;
pub mod permissions;
pub mod protected;
pub mod roles;
pub mod users;
