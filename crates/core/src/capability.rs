//! Capability traits — the contracts the orchestrator expects from its
//! two external answer sources.
//!
//! Neither implementation lives in this crate: the on-device generative
//! runtime is host-provided (probed via `available()`, never assumed),
//! and the remote inference service is reached through a streaming HTTP
//! client in the `palisade-remote` crate. Both stream raw text through
//! `tokio::sync::mpsc` so the orchestrator can apply its per-chunk
//! budget check in strict arrival order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{LocalError, RemoteError};
use crate::message::{Message, Role};

/// A request to load the local model. Repeated loads with the same
/// identifier must be a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub model_identifier: String,
}

/// A generation request against the loaded local model.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// The user prompt.
    pub prompt: String,

    /// Grounding instruction restricting the model to the supplied
    /// context passages.
    pub system_instruction: String,
}

/// The on-device generative model runtime.
#[async_trait]
pub trait LocalAccelerator: Send + Sync {
    /// Whether the accelerator capability is present on this host.
    /// The orchestrator checks this before every local-tier attempt.
    fn available(&self) -> bool;

    /// Load the model. Idempotent per `model_identifier`.
    async fn load(&self, request: &LoadRequest) -> std::result::Result<(), LocalError>;

    /// Generate tokens for the request, streamed in arrival order.
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<String, LocalError>>,
        LocalError,
    >;
}

/// The shape of one message on the remote wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
    pub lang: String,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
            lang: msg.language.clone(),
        }
    }
}

/// The JSON body sent to the remote inference service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteChatRequest {
    /// Trailing conversation window (most recent 16 messages).
    pub messages: Vec<WireMessage>,

    /// Requested answer language.
    pub lang: String,

    /// Anti-forgery token, mirrored in the `X-CSRF` header.
    pub csrf: String,

    /// Honeypot field value; empty for human traffic.
    pub hp: String,
}

/// The remote inference service, reached over a chunked text stream.
#[async_trait]
pub trait RemoteInferenceClient: Send + Sync {
    /// Send the request and return raw incremental text chunks for the
    /// stream decoder. Chunk boundaries carry no meaning.
    async fn stream(
        &self,
        request: RemoteChatRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<String, RemoteError>>,
        RemoteError,
    >;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_message_from_message() {
        let msg = Message::user("hola", "es");
        let wire = WireMessage::from(&msg);
        assert_eq!(wire.lang, "es");
        assert_eq!(wire.content, "hola");
        let json = serde_json::to_string(&wire).unwrap();
        assert!(json.contains(r#""role":"user""#));
    }

    #[test]
    fn remote_request_serializes_expected_fields() {
        let req = RemoteChatRequest {
            messages: vec![],
            lang: "en".into(),
            csrf: "tok".into(),
            hp: String::new(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""csrf":"tok""#));
        assert!(json.contains(r#""hp":"""#));
    }
}
