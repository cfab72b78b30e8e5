//! Anti-forgery token and honeypot helpers.
//!
//! The token is opaque and lives for one session; it is sent both in
//! the request body and mirrored in the `X-CSRF` header so the remote
//! service can compare the two. The honeypot value is a hidden field
//! that human traffic leaves empty.

use uuid::Uuid;

/// Generate a fresh per-session anti-forgery token.
pub fn csrf_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The honeypot field name expected by the remote service.
pub const HONEYPOT_FIELD: &str = "hp";
