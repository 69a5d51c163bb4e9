pub mod cors;
pub mod headers;
pub mod login_throttle;

pub use cors::cors_middleware;
pub use headers::security_headers;
pub use login_throttle::LoginThrottle;
