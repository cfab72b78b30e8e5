//! HTTP client for the remote inference service.
//!
//! Sends the JSON chat body with the anti-forgery header mirroring the
//! body's token, and relays the chunked text-event response as raw
//! chunks for the stream decoder. Chunk boundaries are whatever the
//! transport delivers; the decoder owns line reassembly.

use async_trait::async_trait;
use futures::StreamExt;
use palisade_core::capability::{RemoteChatRequest, RemoteInferenceClient};
use palisade_core::error::RemoteError;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// The anti-forgery header, mirroring the body's `csrf` field.
const CSRF_HEADER: &str = "X-CSRF";

/// `RemoteInferenceClient` over reqwest.
#[derive(Debug)]
pub struct HttpRemoteClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRemoteClient {
    /// Create a client for the given chat endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RemoteError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, RemoteError> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(RemoteError::NotConfigured(
                "remote endpoint URL is empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RemoteError::NotConfigured(e.to_string()))?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl RemoteInferenceClient for HttpRemoteClient {
    async fn stream(
        &self,
        request: RemoteChatRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<String, RemoteError>>,
        RemoteError,
    > {
        debug!(endpoint = %self.endpoint, messages = request.messages.len(), "remote chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .header(CSRF_HEADER, &request.csrf)
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(RemoteError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(RemoteError::AuthenticationFailed(
                "request rejected by the inference service".into(),
            ));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status_code: status,
                message: body,
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            while let Some(chunk_result) = byte_stream.next().await {
                match chunk_result {
                    Ok(bytes) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        if tx.send(Ok(text)).await.is_err() {
                            // receiver dropped; stop reading
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "remote stream interrupted");
                        let _ = tx.send(Err(RemoteError::StreamInterrupted(e.to_string()))).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}
