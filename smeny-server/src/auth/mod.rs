//! Authentication and authorization
//!
//! - `session`: session JWT + cookie helpers
//! - `csrf`: CSRF rule for cookie sessions
//! - `middleware`: `require_auth` / role gates and the `CurrentUser` extractor
//! - `access`: record-level decision table
//! - `rate_limit`: per-IP limits for login and registration

pub mod access;
pub mod csrf;
pub mod middleware;
pub mod rate_limit;
pub mod session;

pub use access::{Action, ResourceKind, authorize};
pub use middleware::{CurrentUser, require_admin, require_auth, require_manager};
pub use rate_limit::RateLimiter;
pub use session::SessionService;
