//! Role checks applied inside handlers.

use conflux_core::error::CoreError;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;

/// Role name granting template administration rights.
pub const ROLE_ADMIN: &str = "admin";

/// Require the admin role for template mutations.
///
/// Failures surface as a 404 (see `AppError`) so non-admins cannot probe
/// which template ids exist.
pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "user {} with role '{}' attempted an admin operation",
            user.user_id, user.role
        ))));
    }
    Ok(())
}
