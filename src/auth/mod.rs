//! Authentication module
//!
//! Supports the two UniFi login schemes: UniFi OS (`/api/auth/login`) and the
//! legacy Network Application (`/api/login`).
//!
//! The `Authenticator` performs the login round-trips; `SessionState` keeps
//! the resulting cookies and CSRF token between requests.

mod authenticator;
mod session;
mod types;

pub use authenticator::Authenticator;
pub use session::{CookieJar, SessionState, CSRF_HEADER};
pub use types::{Credentials, LoginScheme};
