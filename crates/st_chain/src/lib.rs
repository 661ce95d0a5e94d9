//! st_chain — Strand Sync chain state and persistence
//!
//! # Module layout
//! - `chain`   — the append-only, hash-linked chain and its merge rule
//! - `project` — reduce block history to "current value per entity"
//! - `storage` — atomic single-file persistence per chain id
//! - `error`   — unified error type

pub mod chain;
pub mod error;
pub mod project;
pub mod storage;

pub use chain::SyncChain;
pub use error::ChainError;
pub use project::project;
pub use storage::{ChainStore, StoredChain};
