pub mod auth;
pub mod request_logging;

pub use auth::{AuthenticatedUser, PermissionCache};
