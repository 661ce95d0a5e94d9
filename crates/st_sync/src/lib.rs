//! st_sync — Strand Sync service
//!
//! The externally visible verbs of the engine: `commit`, `pull`,
//! `delete_entity`, and the `data` read view, orchestrated over the chain
//! manager, the crypto layer, and an optional untrusted relay.
//!
//! # Module layout
//! - `service` — the dependency-injected sync service object
//! - `relay`   — relay transport trait + HTTP implementation
//! - `error`   — unified error type

pub mod error;
pub mod relay;
pub mod service;

pub use error::SyncError;
pub use relay::{HttpRelay, RelayError, RelayTransport};
pub use service::{SyncConfig, SyncService, SyncStatus};
