//! The sync service — one explicit object per process, constructed at
//! startup and passed by handle to callers.
//!
//! A single mutex guards all chain state, so a `commit` and a `pull` (or
//! two `commit`s) can never read the same head and both append — the
//! mutating path is read-head → append → persist under one lock.
//!
//! Local-first guarantee: a commit succeeds iff local storage succeeds.
//! Relay availability affects nothing but best-effort propagation.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use st_chain::{project, ChainError, ChainStore, StoredChain, SyncChain};
use st_crypto::kdf::sync_key_from_passphrase;
use st_crypto::SyncKey;
use st_proto::{open_block, seal_block, RecordKind, SyncRecord};

use crate::error::SyncError;
use crate::relay::RelayTransport;

/// Construction-time wiring for a [`SyncService`].
pub struct SyncConfig {
    /// Stable identity shared by all devices in the sync relationship.
    pub chain_id: String,
    /// Directory holding the persisted chain file.
    pub data_dir: PathBuf,
    /// Optional untrusted store-and-forward relay.
    pub relay: Option<Arc<dyn RelayTransport>>,
}

/// Snapshot of the service for status surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub chain_id: String,
    pub block_count: usize,
    pub head: String,
    pub pending_records: usize,
    pub unlocked: bool,
    pub relay_configured: bool,
}

struct ServiceState {
    key: Option<SyncKey>,
    salt: Option<[u8; 16]>,
    chain: Option<SyncChain>,
    /// Records committed before a key was available; drained on unlock.
    pending: Vec<SyncRecord>,
}

pub struct SyncService {
    chain_id: String,
    store: ChainStore,
    relay: Option<Arc<dyn RelayTransport>>,
    state: Mutex<ServiceState>,
}

impl SyncService {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            store: ChainStore::new(config.data_dir),
            relay: config.relay,
            state: Mutex::new(ServiceState {
                key: None,
                salt: None,
                chain: None,
                pending: Vec::new(),
            }),
        }
    }

    /// Derive the sync key from the passphrase and the chain's persisted
    /// salt (creating the chain, salt included, on first use), then drain
    /// any records buffered while locked.
    pub async fn unlock(&self, passphrase: &str) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;

        let stored = self.store.load_or_create(&self.chain_id).await?;
        let salt = stored.salt()?;
        let key = sync_key_from_passphrase(passphrase.as_bytes(), &salt)?;

        state.chain = Some(stored.chain);
        state.salt = Some(salt);
        state.key = Some(key);
        info!(chain_id = %self.chain_id, "sync service unlocked");

        if !state.pending.is_empty() {
            let buffered = std::mem::take(&mut state.pending);
            debug!(count = buffered.len(), "draining pending records");
            self.commit_locked(&mut state, buffered).await?;
        }
        Ok(())
    }

    /// Commit records to the local chain and push the block best-effort.
    ///
    /// Without a key this buffers the records and succeeds as a no-op from
    /// the chain's perspective.
    pub async fn commit(&self, records: Vec<SyncRecord>) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;
        if state.key.is_none() {
            debug!(count = records.len(), "no key configured, buffering records");
            state.pending.extend(records);
            return Ok(());
        }
        self.commit_locked(&mut state, records).await
    }

    /// Deletion is a commit of a single tombstone record. Whether the
    /// entity actually disappears from `data` depends on the projection
    /// rule — see `st_chain::project`.
    pub async fn delete_entity(
        &self,
        kind: RecordKind,
        entity_id: impl Into<String>,
    ) -> Result<(), SyncError> {
        self.commit(vec![SyncRecord::tombstone(kind, entity_id)]).await
    }

    /// Fetch, decrypt, validate, and merge candidate blocks from the relay.
    /// Returns the records of the blocks that merged, in merge order.
    /// Rejected candidates (bad decrypt, bad digest, bad link, duplicate)
    /// are dropped silently; only storage failures surface.
    pub async fn pull(&self) -> Result<Vec<SyncRecord>, SyncError> {
        let Some(relay) = self.relay.as_ref() else {
            return Ok(Vec::new());
        };

        let mut state = self.state.lock().await;
        if state.key.is_none() {
            return Err(SyncError::KeyNotConfigured);
        }
        self.ensure_chain(&mut state).await?;

        let chain = state.chain.as_ref().expect("chain ensured above");
        let head_hint = (!chain.blocks.is_empty()).then(|| chain.head.clone());

        let envelopes = match relay.fetch(&self.chain_id, head_hint.as_deref()).await {
            Ok(envelopes) => envelopes,
            Err(e) => {
                // An offline relay is expected and recoverable.
                warn!(chain_id = %self.chain_id, error = %e, "relay fetch failed");
                return Ok(Vec::new());
            }
        };

        let mut merged = Vec::new();
        for envelope in envelopes {
            let key = state.key.as_ref().expect("key checked above");
            let block = match open_block(&envelope, key) {
                Ok(block) => block,
                Err(e) => {
                    debug!(envelope_id = %envelope.envelope_id, error = %e, "dropping undecryptable envelope");
                    continue;
                }
            };

            let chain = state.chain.as_mut().expect("chain ensured above");
            let records = block.records.clone();
            let previous_head = chain.head.clone();
            if !chain.validate_and_merge(block) {
                continue;
            }

            if let Err(e) = self.persist(&mut state).await {
                // Disk is authoritative: un-merge the block memory holds
                // but storage never accepted.
                let chain = state.chain.as_mut().expect("chain ensured above");
                chain.blocks.pop();
                chain.head = previous_head;
                return Err(e);
            }
            merged.extend(records);
        }
        Ok(merged)
    }

    /// The read view: current state per entity for one kind. Works without
    /// a key — the local chain file is readable on its own; the key only
    /// guards what leaves the device.
    pub async fn data(&self, kind: RecordKind) -> Result<Vec<SyncRecord>, SyncError> {
        let mut state = self.state.lock().await;
        if state.chain.is_none() {
            let Some(stored) = self.store.load(&self.chain_id).await? else {
                return Ok(Vec::new());
            };
            state.salt = Some(stored.salt()?);
            state.chain = Some(stored.chain);
        }
        let chain = state.chain.as_ref().expect("chain loaded above");
        Ok(project(chain, kind))
    }

    pub async fn status(&self) -> SyncStatus {
        let state = self.state.lock().await;
        let (block_count, head) = match &state.chain {
            Some(chain) => (chain.blocks.len(), chain.head.clone()),
            None => (0, String::new()),
        };
        SyncStatus {
            chain_id: self.chain_id.clone(),
            block_count,
            head,
            pending_records: state.pending.len(),
            unlocked: state.key.is_some(),
            relay_configured: self.relay.is_some(),
        }
    }

    // ── Internals (all called with the state lock held) ──────────────────────

    async fn ensure_chain(&self, state: &mut ServiceState) -> Result<(), ChainError> {
        if state.chain.is_none() {
            let stored = self.store.load_or_create(&self.chain_id).await?;
            state.salt = Some(stored.salt()?);
            state.chain = Some(stored.chain);
        }
        Ok(())
    }

    async fn persist(&self, state: &mut ServiceState) -> Result<(), SyncError> {
        let salt = state.salt.expect("salt set when chain was loaded");
        let chain = state.chain.as_ref().expect("chain present when persisting");
        let stored = StoredChain::new(salt, chain.clone());
        self.store.save(&stored).await?;
        Ok(())
    }

    async fn commit_locked(
        &self,
        state: &mut ServiceState,
        records: Vec<SyncRecord>,
    ) -> Result<(), SyncError> {
        self.ensure_chain(state).await?;

        let chain = state.chain.as_mut().expect("chain ensured above");
        let previous_head = chain.head.clone();
        let block = chain.append_records(records).clone();

        if let Err(e) = self.persist(state).await {
            let chain = state.chain.as_mut().expect("chain ensured above");
            chain.blocks.pop();
            chain.head = previous_head;
            return Err(e);
        }

        if let Some(relay) = self.relay.as_ref() {
            let key = state.key.as_ref().expect("commit_locked requires a key");
            match seal_block(&block, &self.chain_id, key) {
                Ok(envelope) => {
                    // Best effort: no retry, no re-queue, never rolls back
                    // the local append.
                    if let Err(e) = relay.push(&self.chain_id, envelope).await {
                        warn!(chain_id = %self.chain_id, error = %e, "relay push failed");
                    }
                }
                Err(e) => {
                    warn!(chain_id = %self.chain_id, error = %e, "could not seal block for relay");
                }
            }
        }
        Ok(())
    }
}
