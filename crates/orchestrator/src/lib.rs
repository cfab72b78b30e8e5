//! The tiered resolution orchestrator.
//!
//! A sanitized user query is resolved against three answer sources in
//! order of increasing cost: the extractive retrieval drafter, the
//! on-device generative model (when an accelerator is present), and
//! the remote inference service. Every tier is gated by the session
//! budget and every tier failure degrades into a guardrail signal plus
//! a fallthrough; nothing a tier does can crash the resolution.

pub mod resolver;
pub mod session;

pub use resolver::{AnswerSource, Resolution, ResolutionOrchestrator};
pub use session::{Mode, Session};
