//! Completion and checklist trackers over failing and file-backed storage

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use roadmap_model::StepId;
use roadmap_store::{
    ChecklistTracker, CompletionTracker, FileStore, PersistenceAdapter, StorageKeys,
};
use roadmap_test_utils::{abc_repository, FlakyStore};
use serde_json::json;

#[test]
fn reset_clears_only_the_selected_step() {
    let store = FlakyStore::new();
    let keys = StorageKeys::default();
    let x = StepId::from("x");
    let y = StepId::from("y");

    let mut lists = ChecklistTracker::new(&store, keys.clone());
    lists.toggle_item(&x, 2);
    lists.toggle_item(&y, 0);
    assert!(lists.select(&x).is_checked(2));

    lists.reset_all(&x);
    assert!(lists.select(&x).is_empty());
    assert_eq!(store.raw(&keys.checklist(&x)), Some(json!({})));
    assert!(lists.select(&y).is_checked(0));
    assert_eq!(store.raw(&keys.checklist(&y)), Some(json!({"0": true})));
}

#[test]
fn write_failures_keep_in_memory_state() {
    let store = FlakyStore::new();
    let keys = StorageKeys::default();
    store.fail_writes(true);

    let mut done = CompletionTracker::load(&store, &keys);
    assert!(done.toggle(&StepId::from("a")));
    assert!(done.is_done("a"));
    assert_eq!(store.raw(&keys.completed), None);

    let mut lists = ChecklistTracker::new(&store, keys.clone());
    let a = StepId::from("a");
    assert!(lists.toggle_item(&a, 1));
    assert_eq!(lists.checked_count(&a, 3), 1);
}

#[test]
fn read_failures_start_empty() {
    let store = FlakyStore::new();
    let keys = StorageKeys::default();
    store.put_raw(&keys.completed, json!(["a"]));
    store.put_raw(&keys.checklist(&StepId::from("a")), json!({"0": true}));
    store.fail_reads(true);

    let done = CompletionTracker::load(&store, &keys);
    assert!(!done.is_done("a"));

    let mut lists = ChecklistTracker::new(&store, keys);
    assert!(lists.select(&StepId::from("a")).is_empty());
}

#[test]
fn writes_resume_after_storage_recovers() {
    let store = FlakyStore::new();
    let keys = StorageKeys::default();
    let mut done = CompletionTracker::load(&store, &keys);

    store.fail_writes(true);
    done.toggle(&StepId::from("a"));
    store.fail_writes(false);
    done.toggle(&StepId::from("b"));

    assert_eq!(store.raw(&keys.completed), Some(json!(["a", "b"])));
}

#[test]
fn stale_completed_ids_do_not_count() {
    let store = FlakyStore::new();
    let keys = StorageKeys::default();
    store.put_raw(&keys.completed, json!(["a", "removed-step", "c"]));

    let done = CompletionTracker::load(&store, &keys);
    let repo = abc_repository();
    let summary = done.summary(&repo);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.percent, 67);
    assert_eq!(done.ids().count(), 3);
}

#[test]
fn file_store_persists_both_trackers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let keys = StorageKeys::default();
    let b = StepId::from("b");

    {
        let store = FileStore::open(&path);
        let mut done = CompletionTracker::load(&store, &keys);
        done.toggle(&b);
        let mut lists = ChecklistTracker::new(&store, keys.clone());
        lists.toggle_item(&b, 0);
        lists.toggle_item(&b, 3);
    }

    let store = FileStore::open(&path);
    assert_eq!(store.get("completedStepIds").unwrap(), Some(json!(["b"])));
    assert_eq!(
        store.get("roadmap:checklist:b").unwrap(),
        Some(json!({"0": true, "3": true}))
    );

    let done = CompletionTracker::load(&store, &keys);
    assert!(done.is_done("b"));
    let mut lists = ChecklistTracker::new(&store, keys);
    assert_eq!(lists.checked_count(&b, 4), 2);
}

#[test]
fn custom_keys_are_honored() {
    let store = FlakyStore::new();
    let keys = StorageKeys {
        completed: "done".to_string(),
        checklist_prefix: "todo/".to_string(),
    };
    let mut done = CompletionTracker::load(&store, &keys);
    done.toggle(&StepId::from("a"));
    let mut lists = ChecklistTracker::new(&store, keys);
    lists.toggle_item(&StepId::from("a"), 0);

    assert_eq!(store.raw("done"), Some(json!(["a"])));
    assert_eq!(store.raw("todo/a"), Some(json!({"0": true})));
}

proptest! {
    #[test]
    fn double_toggle_restores_membership(ids in prop::collection::vec("[a-c]", 0..12)) {
        let store = FlakyStore::new();
        let keys = StorageKeys::default();
        let mut done = CompletionTracker::load(&store, &keys);
        for id in &ids {
            done.toggle(&StepId::from(id.as_str()));
        }
        let before: Vec<StepId> = done.ids().cloned().collect();
        for id in ["a", "b", "c"] {
            let id = StepId::from(id);
            done.toggle(&id);
            done.toggle(&id);
        }
        let mut after: Vec<StepId> = done.ids().cloned().collect();
        let mut before = before;
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn checked_count_never_exceeds_item_count(
        toggles in prop::collection::vec(0usize..10, 0..30),
        item_count in 0usize..10,
    ) {
        let store = FlakyStore::new();
        let mut lists = ChecklistTracker::new(&store, StorageKeys::default());
        let step = StepId::from("s");
        for index in toggles {
            lists.toggle_item(&step, index);
        }
        prop_assert!(lists.checked_count(&step, item_count) <= item_count);
    }
}
