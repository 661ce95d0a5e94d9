//! Hash-identified blocks — the unit a chain links and a relay transports.
//!
//! The digest commits to `{block_id, previous_hash, records, created_at}`,
//! excluding the stored `hash` itself. Peers recompute it on every candidate
//! block; a block whose digest disagrees with its stored hash never enters a
//! chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::SyncRecord;

/// `previous_hash` of a chain's first block (hex form of a zeroed digest).
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// An immutable, hashed batch of records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncBlock {
    /// Random UUID, assigned at creation, never recomputed. Merge dedupe key.
    pub block_id: String,
    /// Hash of the predecessor block, or `GENESIS_HASH`.
    pub previous_hash: String,
    /// Insertion order preserved; not deduplicated at this layer.
    pub records: Vec<SyncRecord>,
    pub created_at: DateTime<Utc>,
    /// Hex BLAKE3 digest over all fields above.
    pub hash: String,
}

impl SyncBlock {
    /// Assemble a new block linking to `previous_hash` and seal its digest.
    pub fn build(previous_hash: impl Into<String>, records: Vec<SyncRecord>) -> Self {
        let mut block = Self {
            block_id: Uuid::new_v4().to_string(),
            previous_hash: previous_hash.into(),
            records,
            created_at: Utc::now(),
            hash: String::new(),
        };
        block.hash = block.compute_digest();
        block
    }

    /// Recompute the digest from the block's fields.
    ///
    /// Record canonicalisation relies on `serde_json` struct-field order and
    /// sorted payload object keys, so two devices hashing the same block
    /// agree bit-for-bit.
    pub fn compute_digest(&self) -> String {
        let records_json =
            serde_json::to_vec(&self.records).expect("record batch serialisation is infallible");
        st_crypto::hash::block_digest(
            &self.block_id,
            &self.previous_hash,
            &records_json,
            self.created_at.timestamp_millis(),
        )
    }

    /// True when the stored hash matches the recomputed digest.
    pub fn verify_integrity(&self) -> bool {
        self.compute_digest() == self.hash
    }
}
