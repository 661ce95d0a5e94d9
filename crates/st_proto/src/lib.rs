//! st_proto — Strand Sync protocol types and serialisation
//!
//! # Module layout
//! - `record`   — versioned per-entity facts (the unit applications submit)
//! - `block`    — hash-identified batches of records (the unit chains link)
//! - `envelope` — encrypted block envelopes (the unit the relay sees)
//! - `codec`    — bucket padding so the relay sees uniform ciphertext sizes
//! - `api`      — relay request/response JSON bodies

pub mod api;
pub mod block;
pub mod codec;
pub mod envelope;
pub mod record;

pub use block::{SyncBlock, GENESIS_HASH};
pub use envelope::{open_block, seal_block, EncryptedEnvelope, EnvelopeError};
pub use record::{RecordKind, SyncRecord, TOMBSTONE_VERSION};
