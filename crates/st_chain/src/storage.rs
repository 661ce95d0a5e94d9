//! Atomic single-file persistence, one JSON document per chain id.
//!
//! The whole chain is read before any mutation and rewritten after every
//! mutation. The write goes to `<chain_id>.json.tmp` and is renamed over
//! `<chain_id>.json`, so a crash mid-write leaves either the old file or
//! the new one — never a half-written, unparsable chain.
//!
//! The KDF salt lives in the same document, beside the chain it unlocks.
//! It is not secret; what must never touch disk is the derived key.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chain::SyncChain;
use crate::error::ChainError;

/// On-disk document: chain plus the KDF salt shared by its devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChain {
    /// Hex-encoded 16-byte Argon2id salt.
    pub kdf_salt: String,
    pub chain: SyncChain,
}

impl StoredChain {
    pub fn new(salt: [u8; 16], chain: SyncChain) -> Self {
        Self {
            kdf_salt: hex::encode(salt),
            chain,
        }
    }

    /// Decode the stored salt.
    pub fn salt(&self) -> Result<[u8; 16], ChainError> {
        let bytes = hex::decode(&self.kdf_salt)
            .map_err(|e| ChainError::Corrupt(format!("bad kdf salt: {e}")))?;
        bytes
            .try_into()
            .map_err(|_| ChainError::Corrupt("kdf salt is not 16 bytes".into()))
    }
}

/// File-backed chain storage rooted in one directory.
#[derive(Debug, Clone)]
pub struct ChainStore {
    dir: PathBuf,
}

impl ChainStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn chain_path(&self, chain_id: &str) -> Result<PathBuf, ChainError> {
        // Chain ids become file stems; keep them rooted in our directory.
        if chain_id.is_empty()
            || chain_id.contains('/')
            || chain_id.contains('\\')
            || chain_id.contains("..")
        {
            return Err(ChainError::InvalidChainId(chain_id.to_string()));
        }
        Ok(self.dir.join(format!("{chain_id}.json")))
    }

    /// Load a stored chain. `Ok(None)` when none exists yet; a present but
    /// unparsable or invariant-violating file is an error, never silently
    /// discarded.
    pub async fn load(&self, chain_id: &str) -> Result<Option<StoredChain>, ChainError> {
        let path = self.chain_path(chain_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredChain = serde_json::from_slice(&bytes)?;
        stored.chain.verify()?;
        Ok(Some(stored))
    }

    /// Serialise and atomically replace the chain file.
    pub async fn save(&self, stored: &StoredChain) -> Result<(), ChainError> {
        let path = self.chain_path(&stored.chain.chain_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let bytes = serde_json::to_vec(stored)?;
        let tmp = tmp_path(&path);
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Load the chain for `chain_id`, creating and persisting an empty one
    /// (with a fresh salt) on first use.
    pub async fn load_or_create(&self, chain_id: &str) -> Result<StoredChain, ChainError> {
        if let Some(stored) = self.load(chain_id).await? {
            return Ok(stored);
        }
        let stored = StoredChain::new(st_crypto::kdf::generate_salt(), SyncChain::new(chain_id));
        self.save(&stored).await?;
        info!(chain_id, "created new sync chain");
        Ok(stored)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}
