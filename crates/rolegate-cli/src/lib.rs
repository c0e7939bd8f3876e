//! # rolegate CLI
//!
//! Helpers shared by the `rolegate-cli` binary.

/// Minimum password length accepted for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum username length; matches the `users.username` column.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Splits a comma separated argument into trimmed, non-empty names.
pub fn split_names(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn check_username(username: &str) -> Result<(), String> {
    let length = username.chars().count();
    if length == 0 || length > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be between 1 and {} characters",
            MAX_USERNAME_LENGTH
        ));
    }
    Ok(())
}

pub fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}
