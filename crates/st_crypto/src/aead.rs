//! Authenticated Encryption with Associated Data
//!
//! Uses XChaCha20-Poly1305 (192-bit nonce).
//! Key size: 32 bytes.  Nonce: 24 bytes (random).  Tag: 16 bytes.
//!
//! Ciphertext wire format:
//!   [ nonce (24 bytes) | ciphertext + tag ]
//!
//! A fresh random nonce is drawn per call; with a 24-byte nonce the
//! collision probability is negligible for any realistic block count.

use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng},
    XChaCha20Poly1305,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Encrypt `plaintext` with a 32-byte key, prepending a random 24-byte nonce.
/// `aad` — additional associated data (authenticated but not encrypted).
pub fn encrypt(key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| CryptoError::AeadEncrypt)?;

    let nonce = XChaCha20Poly1305::generate_nonce(&mut AeadOsRng);

    let ciphertext = cipher
        .encrypt(&nonce, chacha20poly1305::aead::Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::AeadEncrypt)?;

    // Prepend nonce
    let mut out = Vec::with_capacity(24 + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt wire-format bytes (nonce || ciphertext+tag).
pub fn decrypt(key: &[u8; 32], data: &[u8], aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if data.len() < 24 {
        return Err(CryptoError::AeadDecrypt);
    }
    let (nonce_bytes, ct) = data.split_at(24);
    let nonce = chacha20poly1305::XNonce::from_slice(nonce_bytes);

    let cipher = XChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| CryptoError::AeadDecrypt)?;

    let plaintext = cipher
        .decrypt(nonce, chacha20poly1305::aead::Payload { msg: ct, aad })
        .map_err(|_| CryptoError::AeadDecrypt)?;

    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = [9u8; 32];
        let ct = encrypt(&key, b"hello sync", b"aad").unwrap();
        let pt = decrypt(&key, &ct, b"aad").unwrap();
        assert_eq!(&pt[..], b"hello sync");
    }

    #[test]
    fn wrong_key_fails() {
        let ct = encrypt(&[9u8; 32], b"hello sync", b"aad").unwrap();
        assert!(decrypt(&[10u8; 32], &ct, b"aad").is_err());
    }

    #[test]
    fn wrong_aad_fails() {
        let key = [9u8; 32];
        let ct = encrypt(&key, b"hello sync", b"aad-1").unwrap();
        assert!(decrypt(&key, &ct, b"aad-2").is_err());
    }

    #[test]
    fn truncated_input_fails() {
        let key = [9u8; 32];
        assert!(decrypt(&key, b"short", b"aad").is_err());
        let ct = encrypt(&key, b"hello sync", b"aad").unwrap();
        assert!(decrypt(&key, &ct[..ct.len() - 1], b"aad").is_err());
    }

    #[test]
    fn fresh_nonce_per_call() {
        let key = [9u8; 32];
        let a = encrypt(&key, b"same plaintext", b"aad").unwrap();
        let b = encrypt(&key, b"same plaintext", b"aad").unwrap();
        assert_ne!(a, b);
        assert_ne!(&a[..24], &b[..24]);
    }
}
