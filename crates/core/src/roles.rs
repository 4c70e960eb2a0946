//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in
//! `20260301000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_SURVEYOR: &str = "Surveyor";

/// All valid role values.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_SURVEYOR];

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}
