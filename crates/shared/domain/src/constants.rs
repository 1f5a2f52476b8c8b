//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Sentinel principals
// =============================================================================

/// Username of the full-trust principal used for internal operations
pub const SYSTEM_USERNAME: &str = "system";

/// Username of the lowest-trust principal used for unauthenticated access
pub const ANONYMOUS_USERNAME: &str = "anonymous";

/// Check if a username belongs to one of the sentinel principals
pub fn is_sentinel_username(username: &str) -> bool {
    username == SYSTEM_USERNAME || username == ANONYMOUS_USERNAME
}

// =============================================================================
// Roles
// =============================================================================

/// Code of the built-in role granting access to everything
pub const FULL_ACCESS_ROLE_CODE: &str = "system-full-access";

/// Display name of the built-in full access role
pub const FULL_ACCESS_ROLE_NAME: &str = "Full Access";

// =============================================================================
// Query macros
// =============================================================================

/// Macro argument that stands for the current user's time zone
pub const USER_TIMEZONE_TOKEN: &str = "USER_TIMEZONE";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;
