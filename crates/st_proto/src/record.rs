//! Versioned per-entity records.
//!
//! A record is one fact about one application entity: "bookmark b1 is now
//! {url: ...} at version 3". The application-side mapping from bookmarks,
//! history rows, knowledge items, workspaces and settings to records lives
//! outside this engine; payloads pass through unexamined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version value marking an entity as deleted.
///
/// Note: under the strictly-greater-version projection rule a tombstone can
/// never win against a previously committed positive version — see
/// `st_chain::project`.
pub const TOMBSTONE_VERSION: i64 = -1;

/// Category of application state a record belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Bookmark,
    History,
    Knowledge,
    Workspace,
    Settings,
}

/// One versioned fact about one entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncRecord {
    pub kind: RecordKind,
    /// Unique within a `kind`. Multiple blocks may carry records for the
    /// same entity; projection picks the winner.
    pub entity_id: String,
    /// Opaque application data.
    pub payload: serde_json::Value,
    /// Creation instant — informational only, never used for ordering.
    pub timestamp: DateTime<Utc>,
    /// Positive = live update; `TOMBSTONE_VERSION` = deletion marker.
    pub version: i64,
}

impl SyncRecord {
    pub fn new(
        kind: RecordKind,
        entity_id: impl Into<String>,
        payload: serde_json::Value,
        version: i64,
    ) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            payload,
            timestamp: Utc::now(),
            version,
        }
    }

    /// Deletion marker for an entity.
    pub fn tombstone(kind: RecordKind, entity_id: impl Into<String>) -> Self {
        Self::new(kind, entity_id, serde_json::Value::Null, TOMBSTONE_VERSION)
    }

    pub fn is_tombstone(&self) -> bool {
        self.version == TOMBSTONE_VERSION
    }
}
