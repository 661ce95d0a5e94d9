//! BLAKE3-based hash utilities
//!
//! The block digest commits to every block field except the stored hash
//! itself. Peers recompute it to validate blocks received from a relay, so
//! the byte layout below is a wire contract: domain separator, then the
//! NUL-terminated id fields, then the canonical JSON of the record batch,
//! then the creation instant as little-endian milliseconds.

/// Digest a block's identifying fields into its chain hash.
///
/// `records_json` must be the canonical `serde_json` encoding of the record
/// batch — all devices serialise the same struct definitions, and
/// `serde_json` sorts payload object keys, so the bytes agree bit-for-bit.
pub fn block_digest(
    block_id: &str,
    previous_hash: &str,
    records_json: &[u8],
    created_at_millis: i64,
) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"strand-block-v1\x00");
    hasher.update(block_id.as_bytes());
    hasher.update(b"\x00");
    hasher.update(previous_hash.as_bytes());
    hasher.update(b"\x00");
    hasher.update(records_json);
    hasher.update(b"\x00");
    hasher.update(&created_at_millis.to_le_bytes());
    hex::encode(hasher.finalize().as_bytes())
}
