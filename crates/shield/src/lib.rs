//! Content-safety shield for Palisade.
//!
//! Provides:
//! - **Scanner**: normalizes and rewrites arbitrary text into a safe
//!   form, and scores the original text for injection/exfiltration risk
//! - **Tokens**: per-session anti-forgery token and honeypot helpers
//!
//! The scanner is a pure function: no randomness, no clock, no I/O.
//! It never fails; if a capability is missing it degrades to pass-through.

pub mod scanner;
pub mod token;

pub use scanner::{scan, sanitize, ScanOptions, ScanOutcome};
pub use token::csrf_token;
