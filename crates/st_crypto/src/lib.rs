//! st_crypto — Strand Sync cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Failures are values; nothing in this crate panics on bad input.
//!
//! # Module layout
//! - `aead`  — XChaCha20-Poly1305 encrypt/decrypt helpers
//! - `kdf`   — Argon2id passphrase-to-key derivation
//! - `hash`  — BLAKE3 utilities (block digests)
//! - `error` — unified error type

pub mod aead;
pub mod error;
pub mod hash;
pub mod kdf;

pub use error::CryptoError;
pub use kdf::SyncKey;
