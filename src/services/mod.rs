//! Services layer
//!
//! Business rules on top of the repositories: validation, visibility and
//! ownership checks, pagination and cache maintenance. Each service has its
//! own error enum; store failures travel as `InternalError`.

pub mod category;
pub mod comment;
pub mod location;
pub mod password;
pub mod post;
pub mod user;

pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use location::{LocationService, LocationServiceError};
pub use password::{hash_password, verify_password};
pub use post::{PostDetail, PostService, PostServiceError};
pub use user::{UserService, UserServiceError, SESSION_LIFETIME_DAYS};

/// Require a non-blank value of at most `max` characters (after trimming).
pub(crate) fn check_length(value: &str, field: &str, max: usize) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(format!("{} cannot be empty", field));
    }
    if len > max {
        return Err(format!("{} must be at most {} characters", field, max));
    }
    Ok(())
}
