//! Core domain types and traits for the Palisade assistant engine.
//!
//! Everything that flows between the resolution tiers lives here:
//! messages and conversations, guardrail signals, stream events, the
//! error taxonomy, and the two capability traits the orchestrator
//! composes (`LocalAccelerator`, `RemoteInferenceClient`).

pub mod capability;
pub mod error;
pub mod event;
pub mod guardrail;
pub mod message;

pub use capability::{
    GenerateRequest, LoadRequest, LocalAccelerator, RemoteChatRequest, RemoteInferenceClient,
    WireMessage,
};
pub use error::{Error, LocalError, RemoteError, Result, RetrievalError};
pub use event::{ControlPayload, StreamEvent};
pub use guardrail::{GuardrailReport, GuardrailSeverity, GuardrailSignal, GuardrailSink};
pub use message::{Conversation, Message, Role};
