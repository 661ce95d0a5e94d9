//! Key derivation
//!
//! `sync_key_from_passphrase` — Argon2id, derives the 32-byte symmetric key
//! every device in a sync relationship uses to seal and open block envelopes.
//!
//! The 16-byte salt is generated once when a chain is first created and is
//! persisted beside the chain metadata (it is not secret). All devices
//! sharing a chain must derive with the same salt, so it travels out-of-band
//! together with the chain id.

use argon2::{Argon2, Params, Version};
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

/// 32-byte sync key derived from the user passphrase. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct SyncKey(pub [u8; 32]);

/// Argon2id parameters — tuned for interactive (desktop) use.
fn argon2_params() -> Params {
    Params::new(
        64 * 1024, // m_cost: 64 MiB
        3,         // t_cost: 3 iterations
        1,         // p_cost: 1 thread
        Some(32),  // output len
    )
    .expect("Static Argon2 params are always valid")
}

/// Derive a sync key from a user passphrase + 16-byte salt.
pub fn sync_key_from_passphrase(
    passphrase: &[u8],
    salt: &[u8; 16],
) -> Result<SyncKey, CryptoError> {
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params());
    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase, salt, &mut output)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(SyncKey(output))
}

/// Generate a fresh random 16-byte salt (call once per new chain; persist it).
pub fn generate_salt() -> [u8; 16] {
    use rand::RngCore;
    let mut salt = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_passphrase_same_salt_same_key() {
        let salt = [7u8; 16];
        let a = sync_key_from_passphrase(b"secret123", &salt).unwrap();
        let b = sync_key_from_passphrase(b"secret123", &salt).unwrap();
        assert_eq!(a.0, b.0);
    }

    #[test]
    fn salt_changes_key() {
        let a = sync_key_from_passphrase(b"secret123", &[1u8; 16]).unwrap();
        let b = sync_key_from_passphrase(b"secret123", &[2u8; 16]).unwrap();
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn passphrase_changes_key() {
        let salt = [7u8; 16];
        let a = sync_key_from_passphrase(b"secret123", &salt).unwrap();
        let b = sync_key_from_passphrase(b"secret124", &salt).unwrap();
        assert_ne!(a.0, b.0);
    }
}
