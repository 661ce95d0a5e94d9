//! Wire codec — padding for sealed blocks.
//!
//! # Padding
//! Block sizes leak information (a settings flip is a few hundred bytes, a
//! workspace snapshot tens of kilobytes), so serialized blocks are padded to
//! fixed-size buckets INSIDE the plaintext before encryption — the relay
//! sees uniform-sized ciphertext.
//!
//! Bucket sizes (bytes): 1024, 4096, 16384, 65536
//! Blocks larger than the top bucket are carried unpadded.

const BUCKET_SIZES: &[usize] = &[1024, 4096, 16384, 65536];

/// Pad plaintext to the next bucket boundary.
///
/// Format: [original_len: u32 LE] [plaintext] [random padding]
///
/// The length prefix allows unambiguous unpadding after decryption.
pub fn pad_to_bucket(plaintext: &[u8]) -> Vec<u8> {
    let needed = 4 + plaintext.len();
    let target = BUCKET_SIZES
        .iter()
        .copied()
        .find(|&b| b >= needed)
        .unwrap_or(needed); // Oversized blocks go out unpadded

    let mut out = Vec::with_capacity(target);
    out.extend_from_slice(&(plaintext.len() as u32).to_le_bytes());
    out.extend_from_slice(plaintext);
    // Fill with random bytes, not zeros (avoids compression leaks)
    let remaining = target.saturating_sub(out.len());
    if remaining > 0 {
        let mut padding = vec![0u8; remaining];
        use rand::RngCore;
        rand::rngs::OsRng.fill_bytes(&mut padding);
        out.extend_from_slice(&padding);
    }
    out
}

/// Remove padding after decryption.
pub fn unpad(padded: &[u8]) -> Result<Vec<u8>, CodecError> {
    if padded.len() < 4 {
        return Err(CodecError::InvalidPadding("too short for length prefix".into()));
    }
    let len = u32::from_le_bytes([padded[0], padded[1], padded[2], padded[3]]) as usize;
    if 4 + len > padded.len() {
        return Err(CodecError::InvalidPadding(format!(
            "length prefix {len} exceeds padded data size {}",
            padded.len()
        )));
    }
    Ok(padded[4..4 + len].to_vec())
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid padding: {0}")]
    InvalidPadding(String),
}
