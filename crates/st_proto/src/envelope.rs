//! Encrypted block envelope — what the relay server sees.
//!
//! The relay is a DUMB STORE-AND-FORWARD: it only sees:
//!   - envelope_id (random UUID, no semantic meaning; ack/dedup only)
//!   - chain_id    (needed for routing — cannot be avoided)
//!   - sent_at     (needed for retention TTL)
//!   - ciphertext  (opaque bytes)
//!
//! The relay CANNOT see: record kinds, entity ids, payloads, block hashes,
//! or how many records a block carries (ciphertext is bucket-padded).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use st_crypto::{aead, CryptoError, SyncKey};

use crate::block::SyncBlock;
use crate::codec::{self, CodecError};

/// Associated data binding ciphertexts to this envelope format.
const ENVELOPE_AAD: &[u8] = b"strand-envelope-v1";

/// On-wire envelope — pushed to and fetched from the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Random UUID — no cryptographic meaning.
    pub envelope_id: String,

    /// Sync identity this envelope belongs to (relay routing key).
    pub chain_id: String,

    /// Timestamp set by sender; relays may use it for retention.
    pub sent_at: DateTime<Utc>,

    /// XChaCha20-Poly1305 ciphertext (nonce || ct+tag), base64-encoded.
    /// Inner content is the bucket-padded canonical JSON of a full block,
    /// including its `hash`.
    pub ciphertext: String,
}

/// Serialize, pad, and encrypt a block for transport. A fresh random nonce
/// is drawn inside the AEAD layer on every call.
pub fn seal_block(
    block: &SyncBlock,
    chain_id: &str,
    key: &SyncKey,
) -> Result<EncryptedEnvelope, EnvelopeError> {
    let plaintext = serde_json::to_vec(block)?;
    let padded = codec::pad_to_bucket(&plaintext);
    let ciphertext = aead::encrypt(&key.0, &padded, ENVELOPE_AAD)?;

    Ok(EncryptedEnvelope {
        envelope_id: Uuid::new_v4().to_string(),
        chain_id: chain_id.to_string(),
        sent_at: Utc::now(),
        ciphertext: URL_SAFE_NO_PAD.encode(&ciphertext),
    })
}

/// Decrypt and deserialize an envelope back into a block.
///
/// Any failure — wrong key, truncated or corrupted ciphertext, bad padding,
/// malformed JSON — comes back as an error value. Callers treat it exactly
/// like a failed chain validation and discard the envelope.
pub fn open_block(envelope: &EncryptedEnvelope, key: &SyncKey) -> Result<SyncBlock, EnvelopeError> {
    let ciphertext = URL_SAFE_NO_PAD
        .decode(&envelope.ciphertext)
        .map_err(CryptoError::Base64Decode)?;
    let padded = aead::decrypt(&key.0, &ciphertext, ENVELOPE_AAD)?;
    let plaintext = codec::unpad(&padded)?;
    Ok(serde_json::from_slice(&plaintext)?)
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::GENESIS_HASH;
    use crate::record::{RecordKind, SyncRecord};

    fn key(byte: u8) -> SyncKey {
        SyncKey([byte; 32])
    }

    fn sample_block() -> SyncBlock {
        SyncBlock::build(
            GENESIS_HASH,
            vec![SyncRecord::new(
                RecordKind::History,
                "h1",
                serde_json::json!({"url": "https://b.com", "title": "B"}),
                1,
            )],
        )
    }

    #[test]
    fn seal_open_roundtrip() {
        let block = sample_block();
        let env = seal_block(&block, "c1", &key(1)).unwrap();
        assert_eq!(env.chain_id, "c1");
        let opened = open_block(&env, &key(1)).unwrap();
        assert_eq!(opened, block);
        assert!(opened.verify_integrity());
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let env = seal_block(&sample_block(), "c1", &key(1)).unwrap();
        assert!(open_block(&env, &key(2)).is_err());
    }

    #[test]
    fn corrupted_ciphertext_fails_to_open() {
        let mut env = seal_block(&sample_block(), "c1", &key(1)).unwrap();
        env.ciphertext = env.ciphertext[..env.ciphertext.len() - 8].to_string();
        assert!(open_block(&env, &key(1)).is_err());

        env.ciphertext = "not base64 at all!!".to_string();
        assert!(open_block(&env, &key(1)).is_err());
    }

    #[test]
    fn sealing_twice_yields_distinct_ciphertext() {
        let block = sample_block();
        let a = seal_block(&block, "c1", &key(1)).unwrap();
        let b = seal_block(&block, "c1", &key(1)).unwrap();
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_ne!(a.envelope_id, b.envelope_id);
    }
}
