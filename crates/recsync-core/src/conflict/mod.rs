//! Conflict records and the project conflict map
//!
//! A conflict is keyed by the record's natural id when it has one, else by
//! its path. There is at most one record per key: newer records replace
//! older ones (see [`reconcile`]) and resolving a key removes it and appends
//! its path to the resolved history.

mod reconcile;
mod recorder;
mod store;

pub use reconcile::{newer, reconcile};
pub use recorder::{ConflictCause, natural_id, record};
pub use store::ConflictStore;

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use recsync_content::Format;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key naming why the file conflicted
pub const META_REASON: &str = "reason";
/// Metadata key for the first diverging location
pub const META_CONFLICT_AT: &str = "conflictAt";
/// Metadata key for the paths where local and remote differ
pub const META_FIELDS: &str = "fields";
/// Metadata key for the decode error of an unparsable side
pub const META_ERROR: &str = "error";

/// Conflicts keyed by natural id or path
pub type ConflictMap = BTreeMap<String, ConflictRecord>;

/// A file whose local and remote versions could not be merged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub path: String,
    pub format: Format,
    pub base: Option<String>,
    pub local: Option<String>,
    pub remote: Option<String>,
    /// RFC 3339 time the conflict was recorded
    pub timestamp: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ConflictRecord {
    /// The key this record is stored under.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.path)
    }

    pub fn reason(&self) -> Option<&str> {
        self.metadata.get(META_REASON).and_then(Value::as_str)
    }

    pub fn conflict_at(&self) -> Option<&str> {
        self.metadata.get(META_CONFLICT_AT).and_then(Value::as_str)
    }

    /// Paths where local and remote differ, when known.
    pub fn fields(&self) -> Vec<String> {
        self.metadata
            .get(META_FIELDS)
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok()
    }
}

/// The persisted conflict document of one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictState {
    #[serde(default)]
    pub conflicts: ConflictMap,
    /// Paths resolved by an operator, oldest first
    #[serde(default)]
    pub resolved: Vec<String>,
}

impl ConflictState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &str) -> Option<&ConflictRecord> {
        self.conflicts.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.conflicts.keys().cloned().collect()
    }

    /// Merge `incoming` into the map, newer records winning.
    pub fn reconcile(&mut self, incoming: &ConflictMap) {
        self.conflicts = reconcile(&self.conflicts, incoming);
    }

    /// Remove the record under `key` and note its path as resolved.
    pub fn resolve(&mut self, key: &str) -> Option<ConflictRecord> {
        let record = self.conflicts.remove(key)?;
        if !self.resolved.contains(&record.path) {
            self.resolved.push(record.path.clone());
        }
        Some(record)
    }

    /// Drop every record for `path`, returning how many were removed.
    pub fn remove_path(&mut self, path: &str) -> usize {
        let before = self.conflicts.len();
        self.conflicts.retain(|_, record| record.path != path);
        before - self.conflicts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(id: Option<&str>, path: &str) -> ConflictRecord {
        ConflictRecord {
            id: id.map(str::to_string),
            path: path.to_string(),
            format: Format::Json,
            base: None,
            local: Some("{}".into()),
            remote: Some("[]".into()),
            timestamp: "2026-01-01T00:00:00Z".into(),
            metadata: Map::new(),
        }
    }

    #[test]
    fn key_prefers_id() {
        assert_eq!(sample(Some("p1"), "a.json").key(), "p1");
        assert_eq!(sample(None, "a.json").key(), "a.json");
    }

    #[test]
    fn resolve_records_history_once() {
        let mut state = ConflictState::new();
        state.conflicts.insert("p1".into(), sample(Some("p1"), "a.json"));
        assert!(state.resolve("p1").is_some());
        state.conflicts.insert("p1".into(), sample(Some("p1"), "a.json"));
        state.resolve("p1");
        assert_eq!(state.resolved, vec!["a.json".to_string()]);
        assert!(state.resolve("p1").is_none());
    }

    #[test]
    fn remove_path_drops_all_keys_for_path() {
        let mut state = ConflictState::new();
        state.conflicts.insert("p1".into(), sample(Some("p1"), "a.json"));
        state.conflicts.insert("b.json".into(), sample(None, "b.json"));
        assert_eq!(state.remove_path("a.json"), 1);
        assert_eq!(state.keys(), vec!["b.json".to_string()]);
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_value(sample(None, "a.json")).unwrap();
        assert_eq!(json["format"], "json");
        assert!(json.get("id").is_none());
        assert!(json["base"].is_null());
    }
}
