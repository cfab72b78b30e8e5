//! Error types for the Palisade domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. No tier error is
//! allowed to escape the orchestrator: the resolution loop converts
//! every one of these into a guardrail signal plus a fallthrough.

use thiserror::Error;

/// The top-level error type for all Palisade operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Local accelerator error: {0}")]
    Local(#[from] LocalError),

    #[error("Remote inference error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// The corpus pack could not be read or parsed. Treated as
    /// "no extractive answer" by the orchestrator, never fatal.
    #[error("Corpus unavailable: {0}")]
    CorpusUnavailable(String),

    #[error("Corpus pack malformed: {0}")]
    MalformedPack(String),
}

#[derive(Debug, Clone, Error)]
pub enum LocalError {
    /// No accelerator capability present on this host.
    #[error("Accelerator unavailable: {0}")]
    Unavailable(String),

    #[error("Model load failed: {0}")]
    LoadFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Endpoint not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_status() {
        let err = Error::Remote(RemoteError::Api {
            status_code: 502,
            message: "bad gateway".into(),
        });
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn retrieval_error_wraps() {
        let err: Error = RetrievalError::CorpusUnavailable("missing file".into()).into();
        assert!(err.to_string().contains("missing file"));
    }
}
