//! Per-session state: conversation history, budget ledger, and the
//! request-hardening values forwarded to the remote service.
//!
//! Exactly one resolution is in flight per session at a time; the
//! orchestrator takes `&mut Session` and relies on its caller to
//! serialize calls.

use palisade_budget::BudgetState;
use palisade_core::message::Conversation;
use serde::{Deserialize, Serialize};

/// Which tiers a resolution may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Retrieval and the on-device model only; the remote service is
    /// never contacted.
    Local,
    /// All three tiers, cheapest first.
    Hybrid,
    /// Retrieval and the remote service; the on-device model is skipped.
    External,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "hybrid" => Ok(Self::Hybrid),
            "external" => Ok(Self::External),
            other => Err(format!("unknown mode {other:?}")),
        }
    }
}

/// The state owned by one conversation session.
#[derive(Debug, Clone)]
pub struct Session {
    pub conversation: Conversation,
    pub budget: BudgetState,
    pub language: String,
    pub mode: Mode,
    /// Anti-forgery token, fixed for the session.
    pub csrf: String,
    /// Honeypot field value; stays empty for human traffic.
    pub honeypot: String,
}

impl Session {
    /// Start a fresh session. The budget resets here and nowhere else.
    pub fn new(language: impl Into<String>, mode: Mode, budget: BudgetState) -> Self {
        Self {
            conversation: Conversation::new(),
            budget,
            language: language.into(),
            mode,
            csrf: palisade_shield::csrf_token(),
            honeypot: String::new(),
        }
    }
}
