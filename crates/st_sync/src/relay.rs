//! Relay transport — the untrusted store-and-forward collaborator.
//!
//! The relay only ever sees `EncryptedEnvelope`s. Retry and timeout policy
//! belongs here (or to the HTTP client's defaults), never to the engine:
//! the service treats a failed push as logged-and-forgotten and a failed
//! fetch as "no new data".

use async_trait::async_trait;
use thiserror::Error;

use st_proto::api::{FetchRequest, FetchResponse, PushRequest};
use st_proto::EncryptedEnvelope;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Relay returned HTTP {0}")]
    Status(u16),
}

/// Generic request/response channel to a relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Submit one sealed block. Fire-and-forget from the engine's side.
    async fn push(&self, chain_id: &str, envelope: EncryptedEnvelope) -> Result<(), RelayError>;

    /// Request candidate envelopes. `since_head` is a filtering hint the
    /// relay is free to ignore; devices dedupe by block id regardless.
    async fn fetch(
        &self,
        chain_id: &str,
        since_head: Option<&str>,
    ) -> Result<Vec<EncryptedEnvelope>, RelayError>;
}

/// HTTP relay speaking JSON to `{base}/push` and `{base}/fetch`.
pub struct HttpRelay {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RelayTransport for HttpRelay {
    async fn push(&self, chain_id: &str, envelope: EncryptedEnvelope) -> Result<(), RelayError> {
        let body = PushRequest {
            chain_id: chain_id.to_string(),
            envelope,
        };
        let resp = self
            .client
            .post(format!("{}/push", self.base_url))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RelayError::Status(resp.status().as_u16()));
        }
        Ok(())
    }

    async fn fetch(
        &self,
        chain_id: &str,
        since_head: Option<&str>,
    ) -> Result<Vec<EncryptedEnvelope>, RelayError> {
        let body = FetchRequest {
            chain_id: chain_id.to_string(),
            since_head: since_head.map(str::to_string),
        };
        let resp = self
            .client
            .post(format!("{}/fetch", self.base_url))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RelayError::Status(resp.status().as_u16()));
        }
        let fetched: FetchResponse = resp.json().await?;
        Ok(fetched.envelopes)
    }
}
