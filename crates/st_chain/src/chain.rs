//! The append-only, hash-linked chain for one sync identity.
//!
//! Every block commits to its predecessor's hash, so modification,
//! insertion, and reordering anywhere in the history are detectable by
//! recomputing digests. Blocks are never edited or removed once appended.
//!
//! The history is mostly-linear by assumption: if two devices commit
//! concurrently while offline, each produces a block pointing at the same
//! `previous_hash`, and only one of the two can ever be accepted into any
//! downstream chain — the sibling is rejected by `validate_and_merge` and
//! its records are dropped. Resolving such forks needs a DAG/CRDT model,
//! which this engine deliberately does not implement.

use serde::{Deserialize, Serialize};
use tracing::debug;

use st_proto::{SyncBlock, SyncRecord, GENESIS_HASH};

use crate::error::ChainError;

/// Device-local append-only log for one sync relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncChain {
    /// Stable identifier shared by every device in the relationship.
    pub chain_id: String,
    /// Hash of the last block; empty string iff `blocks` is empty.
    pub head: String,
    pub blocks: Vec<SyncBlock>,
}

impl SyncChain {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            head: String::new(),
            blocks: Vec::new(),
        }
    }

    /// The `previous_hash` the next block must carry.
    pub fn link_target(&self) -> &str {
        if self.blocks.is_empty() {
            GENESIS_HASH
        } else {
            &self.head
        }
    }

    /// Build a block over `records`, link it to the current tail, and
    /// advance the head. The only local entry path for blocks.
    pub fn append_records(&mut self, records: Vec<SyncRecord>) -> &SyncBlock {
        let block = SyncBlock::build(self.link_target(), records);
        self.head = block.hash.clone();
        self.blocks.push(block);
        self.blocks.last().expect("block was just pushed")
    }

    /// Validate a candidate block received from a peer and append it.
    ///
    /// Rejects (returning `false`, chain unchanged) when the candidate's
    /// stored hash does not match its recomputed digest, when its block id
    /// is already present, or when it does not link to the current tail.
    pub fn validate_and_merge(&mut self, candidate: SyncBlock) -> bool {
        if !candidate.verify_integrity() {
            debug!(block_id = %candidate.block_id, "rejecting block: digest mismatch");
            return false;
        }
        if self.blocks.iter().any(|b| b.block_id == candidate.block_id) {
            debug!(block_id = %candidate.block_id, "rejecting block: already merged");
            return false;
        }
        if candidate.previous_hash != self.link_target() {
            debug!(
                block_id = %candidate.block_id,
                expected = %self.link_target(),
                got = %candidate.previous_hash,
                "rejecting block: does not link to chain tail"
            );
            return false;
        }
        self.head = candidate.hash.clone();
        self.blocks.push(candidate);
        true
    }

    /// Whole-chain invariant check, run after loading from storage.
    pub fn verify(&self) -> Result<(), ChainError> {
        if self.blocks.is_empty() {
            if !self.head.is_empty() {
                return Err(ChainError::Corrupt("head set on empty chain".into()));
            }
            return Ok(());
        }

        let mut prev = GENESIS_HASH;
        for (i, block) in self.blocks.iter().enumerate() {
            if !block.verify_integrity() {
                return Err(ChainError::Corrupt(format!(
                    "block {i} ({}) fails digest check",
                    block.block_id
                )));
            }
            if block.previous_hash != prev {
                return Err(ChainError::Corrupt(format!(
                    "block {i} ({}) does not link to its predecessor",
                    block.block_id
                )));
            }
            prev = &block.hash;
        }

        let tail = &self.blocks[self.blocks.len() - 1];
        if self.head != tail.hash {
            return Err(ChainError::Corrupt("head does not match tail hash".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use st_proto::RecordKind;

    fn record(entity_id: &str, version: i64) -> SyncRecord {
        SyncRecord::new(RecordKind::Bookmark, entity_id, json!({"v": version}), version)
    }

    #[test]
    fn append_links_and_advances_head() {
        let mut chain = SyncChain::new("c1");
        assert_eq!(chain.link_target(), GENESIS_HASH);

        let first_hash = chain.append_records(vec![record("b1", 1)]).hash.clone();
        assert_eq!(chain.head, first_hash);
        assert_eq!(chain.blocks[0].previous_hash, GENESIS_HASH);

        let second_hash = chain.append_records(vec![record("b2", 1)]).hash.clone();
        assert_eq!(chain.head, second_hash);
        assert_eq!(chain.blocks[1].previous_hash, first_hash);
        chain.verify().unwrap();
    }

    #[test]
    fn merge_accepts_a_well_linked_block() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![record("b1", 1)]);

        let candidate = SyncBlock::build(chain.head.clone(), vec![record("b2", 1)]);
        let hash = candidate.hash.clone();
        assert!(chain.validate_and_merge(candidate));
        assert_eq!(chain.head, hash);
        assert_eq!(chain.blocks.len(), 2);
        chain.verify().unwrap();
    }

    #[test]
    fn merge_rejects_bad_link() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![record("b1", 1)]);
        let before = chain.clone();

        let mut candidate = SyncBlock::build(chain.head.clone(), vec![record("b2", 1)]);
        candidate.previous_hash = "f".repeat(64);
        candidate.hash = candidate.compute_digest(); // self-consistent, but mislinked
        assert!(!chain.validate_and_merge(candidate));

        assert_eq!(chain.head, before.head);
        assert_eq!(chain.blocks.len(), before.blocks.len());
    }

    #[test]
    fn merge_rejects_tampered_digest() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![record("b1", 1)]);

        let mut candidate = SyncBlock::build(chain.head.clone(), vec![record("b2", 1)]);
        candidate.records[0].version = 42; // stored hash now stale
        assert!(!chain.validate_and_merge(candidate));
        assert_eq!(chain.blocks.len(), 1);
    }

    #[test]
    fn merge_is_idempotent_by_block_id() {
        let mut chain = SyncChain::new("c1");
        let candidate = SyncBlock::build(GENESIS_HASH, vec![record("b1", 1)]);

        assert!(chain.validate_and_merge(candidate.clone()));
        let after_first = chain.clone();
        assert!(!chain.validate_and_merge(candidate));
        assert_eq!(chain.blocks.len(), after_first.blocks.len());
        assert_eq!(chain.head, after_first.head);
    }

    #[test]
    fn concurrent_sibling_is_rejected() {
        // Two offline devices both extend the same parent; the second
        // sibling to arrive is dropped permanently.
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![record("b1", 1)]);
        let parent = chain.head.clone();

        let winner = SyncBlock::build(parent.clone(), vec![record("b2", 1)]);
        let loser = SyncBlock::build(parent, vec![record("b3", 1)]);

        assert!(chain.validate_and_merge(winner));
        assert!(!chain.validate_and_merge(loser));
    }

    #[test]
    fn verify_flags_interior_tampering() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![record("b1", 1)]);
        chain.append_records(vec![record("b2", 1)]);
        chain.verify().unwrap();

        chain.blocks[0].records[0].version = 99;
        assert!(chain.verify().is_err());
    }
}
