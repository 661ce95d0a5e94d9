//! Relay request/response types shared between devices and relay services.
//! These map directly to JSON bodies on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::envelope::EncryptedEnvelope;

#[derive(Debug, Serialize, Deserialize)]
pub struct PushRequest {
    pub chain_id: String,
    pub envelope: EncryptedEnvelope,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PushResponse {
    pub envelope_id: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchRequest {
    pub chain_id: String,
    /// The caller's current chain head — a filtering hint only. Relays may
    /// ignore it and over-return; devices dedupe by block id regardless.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_head: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResponse {
    pub envelopes: Vec<EncryptedEnvelope>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
