//! Session-cookie identity and CSRF protection.
//!
//! Requests are mapped to a user through an opaque session cookie backed by
//! an in-memory store; state-changing requests are additionally checked
//! against a double-submit CSRF token. Handlers see both through
//! [`context::RequestContext`].

pub mod context;
pub mod cookies;
pub mod csrf;
pub mod password;
pub mod session;
