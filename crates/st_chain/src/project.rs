//! Projection — reduce the flat block history to "current value per entity".
//!
//! The winner for each entity is the record with the strictly greatest
//! version seen in chain order; ties and lower versions never replace the
//! incumbent. A consequence worth spelling out: a tombstone (`version ==
//! -1`) posted after any positive-version record for the same entity never
//! wins, so the entity stays visible. That is the compatibility contract
//! this engine ships with; the tests pin it.

use std::collections::BTreeMap;

use st_proto::{RecordKind, SyncRecord};

use crate::chain::SyncChain;

/// Current state per entity for the requested `kind`.
///
/// Output order follows entity id (the underlying map is sorted); it carries
/// no semantic meaning.
pub fn project(chain: &SyncChain, kind: RecordKind) -> Vec<SyncRecord> {
    let mut latest: BTreeMap<&str, &SyncRecord> = BTreeMap::new();

    for block in &chain.blocks {
        for record in &block.records {
            if record.kind != kind {
                continue;
            }
            match latest.get(record.entity_id.as_str()) {
                Some(existing) if record.version <= existing.version => {}
                _ => {
                    latest.insert(&record.entity_id, record);
                }
            }
        }
    }

    latest.into_values().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use st_proto::RecordKind;

    fn bookmark(entity_id: &str, version: i64, payload: serde_json::Value) -> SyncRecord {
        SyncRecord::new(RecordKind::Bookmark, entity_id, payload, version)
    }

    #[test]
    fn higher_version_wins() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![bookmark("b1", 1, json!({"url": "https://old.com"}))]);
        chain.append_records(vec![bookmark("b1", 2, json!({"url": "https://new.com"}))]);

        let result = project(&chain, RecordKind::Bookmark);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].version, 2);
        assert_eq!(result[0].payload, json!({"url": "https://new.com"}));
    }

    #[test]
    fn equal_version_does_not_replace() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![bookmark("b1", 1, json!({"url": "https://first.com"}))]);
        chain.append_records(vec![bookmark("b1", 1, json!({"url": "https://second.com"}))]);

        let result = project(&chain, RecordKind::Bookmark);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].payload, json!({"url": "https://first.com"}));
    }

    #[test]
    fn tombstone_does_not_win() {
        // version -1 is never strictly greater than a positive version, so
        // the deletion is invisible through projection. Intentionally pinned.
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![bookmark("b1", 1, json!({"url": "https://a.com"}))]);
        chain.append_records(vec![SyncRecord::tombstone(RecordKind::Bookmark, "b1")]);

        let result = project(&chain, RecordKind::Bookmark);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].version, 1);
        assert_eq!(result[0].payload, json!({"url": "https://a.com"}));
    }

    #[test]
    fn tombstone_wins_when_nothing_preceded_it() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![SyncRecord::tombstone(RecordKind::Bookmark, "b1")]);

        let result = project(&chain, RecordKind::Bookmark);
        assert_eq!(result.len(), 1);
        assert!(result[0].is_tombstone());
    }

    #[test]
    fn kinds_do_not_cross_contaminate() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![
            bookmark("x", 1, json!({})),
            SyncRecord::new(RecordKind::History, "x", json!({}), 5),
        ]);

        let bookmarks = project(&chain, RecordKind::Bookmark);
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].version, 1);

        let history = project(&chain, RecordKind::History);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].version, 5);
    }

    #[test]
    fn later_records_in_same_block_follow_the_same_rule() {
        let mut chain = SyncChain::new("c1");
        chain.append_records(vec![
            bookmark("b1", 2, json!({"url": "https://keep.com"})),
            bookmark("b1", 1, json!({"url": "https://stale.com"})),
        ]);

        let result = project(&chain, RecordKind::Bookmark);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].payload, json!({"url": "https://keep.com"}));
    }

    #[test]
    fn empty_chain_projects_nothing() {
        let chain = SyncChain::new("c1");
        assert!(project(&chain, RecordKind::Settings).is_empty());
    }
}
