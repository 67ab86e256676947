//! Tests for conflict map reconciliation and persistence

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use recsync_content::Format;
use recsync_core::conflict::{ConflictMap, ConflictRecord, ConflictState, ConflictStore, reconcile};
use recsync_core::Error;
use recsync_fs::{RecordStore, SyncPath};
use recsync_test_utils::TestProject;
use rstest::rstest;
use serde_json::Map;

fn record(key: &str, local: &str, timestamp: &str) -> ConflictRecord {
    ConflictRecord {
        id: Some(key.to_string()),
        path: format!("{key}.json"),
        format: Format::Json,
        base: None,
        local: Some(local.to_string()),
        remote: Some("{}".to_string()),
        timestamp: timestamp.to_string(),
        metadata: Map::new(),
    }
}

fn map(records: impl IntoIterator<Item = ConflictRecord>) -> ConflictMap {
    records
        .into_iter()
        .map(|r| (r.key().to_string(), r))
        .collect()
}

#[rstest]
#[case::incoming_newer("2026-01-01T00:00:00Z", "2026-01-02T00:00:00Z", "incoming")]
#[case::existing_newer("2026-01-02T00:00:00Z", "2026-01-01T00:00:00Z", "existing")]
#[case::tie_goes_to_incoming("2026-01-01T00:00:00Z", "2026-01-01T00:00:00Z", "incoming")]
#[case::offsets_compare_as_instants("2026-01-01T10:00:00+02:00", "2026-01-01T09:00:00Z", "incoming")]
#[case::unparsable_existing("yesterday", "2026-01-01T00:00:00Z", "incoming")]
#[case::unparsable_incoming("2026-01-01T00:00:00Z", "later", "incoming")]
fn shared_keys_keep_the_newer_record(
    #[case] existing: &str,
    #[case] incoming: &str,
    #[case] winner: &str,
) {
    let merged = reconcile(
        &map([record("r", "existing", existing)]),
        &map([record("r", "incoming", incoming)]),
    );
    assert_eq!(merged.len(), 1);
    assert_eq!(merged["r"].local.as_deref(), Some(winner));
}

#[test]
fn disjoint_keys_are_all_kept() {
    let merged = reconcile(
        &map([record("a", "1", "2026-01-01T00:00:00Z")]),
        &map([record("b", "2", "2026-01-01T00:00:00Z")]),
    );
    let keys: Vec<_> = merged.keys().cloned().collect();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn resolving_records_history_once() {
    let mut state = ConflictState::new();
    state.reconcile(&map([record("a", "1", "2026-01-01T00:00:00Z")]));

    assert!(state.resolve("a").is_some());
    state.reconcile(&map([record("a", "2", "2026-01-02T00:00:00Z")]));
    assert!(state.resolve("a").is_some());

    assert!(state.is_empty());
    assert_eq!(state.resolved, vec!["a.json".to_string()]);
    assert!(state.resolve("a").is_none());
}

#[test]
fn state_survives_a_save_and_load() {
    let project = TestProject::new();
    let store = project.store();
    let conflicts = ConflictStore::new(&store);

    let mut state = ConflictState::new();
    state.reconcile(&map([
        record("a", "1", "2026-01-01T00:00:00.000Z"),
        record("b", "2", "2026-01-01T00:00:00.000Z"),
    ]));
    state.resolve("b");
    conflicts.save(&state).unwrap();

    assert_eq!(conflicts.load().unwrap(), state);
    let text = project.read(SyncPath::ConflictsFile.as_str()).unwrap();
    assert!(text.contains("\"conflicts\""));
    assert!(text.ends_with('\n'));
}

#[test]
fn missing_conflicts_file_loads_empty() {
    let project = TestProject::new();
    let store = project.store();
    assert!(ConflictStore::new(&store).load().unwrap().is_empty());
}

#[test]
fn corrupt_conflicts_file_is_an_error() {
    let project = TestProject::new();
    let store = project.store();
    store
        .write_file(SyncPath::ConflictsFile.as_str(), "{ not json")
        .unwrap();

    let err = ConflictStore::new(&store).load().unwrap_err();
    assert!(matches!(err, Error::CorruptState { .. }), "{err}");
}

fn timestamps() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..28).prop_map(|d| format!("2026-02-{d:02}T00:00:00Z")),
        Just("not a time".to_string()),
    ]
}

proptest! {
    #[test]
    fn reconciling_a_map_with_itself_changes_nothing(
        entries in proptest::collection::btree_map("[a-d]", timestamps(), 0..4)
    ) {
        let conflicts = map(entries.iter().map(|(k, ts)| record(k, k, ts)));
        prop_assert_eq!(reconcile(&conflicts, &conflicts), conflicts.clone());
    }

    #[test]
    fn reconciling_with_nothing_keeps_every_record(
        entries in proptest::collection::btree_map("[a-d]", timestamps(), 0..4)
    ) {
        let conflicts = map(entries.iter().map(|(k, ts)| record(k, k, ts)));
        prop_assert_eq!(reconcile(&conflicts, &ConflictMap::new()), conflicts.clone());
    }

    #[test]
    fn reconciling_twice_equals_reconciling_once(
        existing in proptest::collection::btree_map("[a-f]", timestamps(), 0..4),
        incoming in proptest::collection::btree_map("[a-f]", timestamps(), 0..4),
    ) {
        let existing = map(existing.iter().map(|(k, ts)| record(k, "existing", ts)));
        let incoming = map(incoming.iter().map(|(k, ts)| record(k, "incoming", ts)));
        let once = reconcile(&existing, &incoming);
        prop_assert_eq!(reconcile(&once, &incoming), once);
    }

    #[test]
    fn reconciled_keys_are_the_union(
        left in proptest::collection::btree_set("[a-f]", 0..4),
        right in proptest::collection::btree_set("[a-f]", 0..4),
    ) {
        let ts = "2026-01-01T00:00:00Z";
        let merged = reconcile(
            &map(left.iter().map(|k| record(k, "l", ts))),
            &map(right.iter().map(|k| record(k, "r", ts))),
        );
        let expected: Vec<_> = left.union(&right).cloned().collect();
        prop_assert_eq!(merged.keys().cloned().collect::<Vec<_>>(), expected);
        for key in &right {
            prop_assert_eq!(merged[key].local.as_deref(), Some("r"));
        }
    }
}
