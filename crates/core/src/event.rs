//! Typed events produced by the chunked-stream decoder.
//!
//! Events are emitted one at a time, in arrival order, and consumed
//! within a single resolution call.

use serde::{Deserialize, Serialize};

/// One decoded event from the incremental text-event protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Answer text to surface to the user (budget-gated by the caller).
    Content { payload: String },

    /// An out-of-band control signal (guardrail-shaped payload).
    Control { payload: ControlPayload },

    /// End of stream. Nothing follows.
    End,
}

/// Canonical control payload schema.
///
/// Upstream services have historically sent several ad hoc shapes
/// (`level`, `severity`, bare `error`/`warning` strings, `guard`
/// objects). The decoder normalizes all of them into this one struct;
/// the sniffing lives in the stream crate as a compatibility shim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPayload {
    /// "warn" or "error"; anything unrecognized is treated as "warn".
    #[serde(default = "default_level")]
    pub level: String,

    /// Stable code when the service supplied one.
    #[serde(default)]
    pub code: Option<String>,

    /// Human-readable detail.
    #[serde(default)]
    pub message: String,
}

fn default_level() -> String {
    "warn".into()
}

impl ControlPayload {
    pub fn is_error(&self) -> bool {
        self.level.eq_ignore_ascii_case("error")
    }
}
