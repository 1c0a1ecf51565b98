//! Local store behavior across edits, commits and concurrent access

mod common;

use std::sync::Barrier;
use std::thread;

use common::{FakePlatform, ORG, client, open_store};
use pretty_assertions::assert_eq;
use rulectl_core::model::{Entity, EntityId, EntityKind, Rule, Ruleset};
use rulectl_core::store::{AppliedChange, EntityStatus, LocalStore};
use rulectl_core::{Editor, Error, compute_plan, refresh};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn commit_assigns_remote_id_and_clears_marker() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    let ruleset = Editor::new(&store)
        .create_ruleset(&json!({"name": "Base"}))
        .unwrap();
    let before = store.record(EntityKind::Ruleset, &ruleset.id).unwrap().unwrap();
    assert_eq!(before.status, EntityStatus::Created);
    assert_eq!(before.status.marker(), '+');

    let mut sent = Entity::Ruleset(ruleset.clone());
    sent.set_remote_id("rs-42".to_string());
    store.commit_baseline(&[AppliedChange::Upserted(sent)]).unwrap();

    let after = store.record(EntityKind::Ruleset, &ruleset.id).unwrap().unwrap();
    assert_eq!(after.status, EntityStatus::Unmodified);
    assert_eq!(after.entity.remote_id(), Some("rs-42"));
    let baseline = store.baseline().unwrap();
    assert_eq!(
        baseline.remote_id(EntityKind::Ruleset, &ruleset.id),
        Some("rs-42")
    );
    assert!(baseline.committed_at.is_some());
}

#[tokio::test]
async fn committed_removal_deletes_tombstone_files() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    let platform = FakePlatform::new();
    let rs = platform.seed_ruleset("Base");
    platform.seed_rule(&rs, "One");
    refresh(&store, &client(&platform)).await.unwrap();

    let rule = store.list(EntityKind::Rule, None).unwrap()[0].clone();
    let ruleset_key = rule.parent().unwrap().clone();
    Editor::new(&store).delete_rule(rule.id()).unwrap();

    let tombstone = store.record(EntityKind::Rule, rule.id()).unwrap().unwrap();
    assert_eq!(tombstone.status, EntityStatus::Deleted);
    assert!(store.get(EntityKind::Rule, rule.id()).is_err());

    store
        .commit_baseline(&[AppliedChange::Removed {
            kind: EntityKind::Rule,
            id: rule.id().clone(),
        }])
        .unwrap();

    assert!(store.record(EntityKind::Rule, rule.id()).unwrap().is_none());
    assert!(store.record(EntityKind::Tags, rule.id()).unwrap().is_none());
    let rule_dir = store
        .layout()
        .mirror()
        .join(ruleset_key.as_str())
        .join(rule.id().as_str());
    assert!(!rule_dir.exists());
    let baseline = store.baseline().unwrap();
    assert!(!baseline.contains(EntityKind::Rule, rule.id()));
    assert!(!baseline.contains(EntityKind::Tags, rule.id()));
}

#[tokio::test]
async fn replace_all_leaves_no_staging_directories() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    let platform = FakePlatform::new();
    platform.seed_ruleset("Base");

    refresh(&store, &client(&platform)).await.unwrap();
    refresh(&store, &client(&platform)).await.unwrap();

    assert!(store.has_mirror());
    assert!(!store.layout().incoming().exists());
    assert!(!store.layout().previous().exists());
}

#[test]
fn reopening_discards_incomplete_refresh() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    Editor::new(&store)
        .create_ruleset(&json!({"name": "Base"}))
        .unwrap();
    let incoming = store.layout().incoming();
    std::fs::create_dir_all(incoming.join("stray").to_native()).unwrap();

    let reopened = open_store(&dir, ORG);

    assert!(!incoming.exists());
    assert_eq!(reopened.list(EntityKind::Ruleset, None).unwrap().len(), 1);
}

#[test]
fn snapshots_stay_consistent_under_concurrent_edits() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    let ruleset = Editor::new(&store)
        .create_ruleset(&json!({"name": "Base"}))
        .unwrap();

    const WRITERS: usize = 4;
    const RULES_PER_WRITER: usize = 5;
    let barrier = Barrier::new(WRITERS + 1);

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let store: &LocalStore = &store;
            let barrier = &barrier;
            let ruleset = &ruleset;
            scope.spawn(move || {
                barrier.wait();
                let editor = Editor::new(store);
                for n in 0..RULES_PER_WRITER {
                    editor
                        .create_rule(
                            &ruleset.id,
                            &json!({"name": format!("w{writer}-r{n}"), "type": "File"}),
                        )
                        .unwrap();
                }
            });
        }

        barrier.wait();
        for _ in 0..20 {
            let snapshot = store.snapshot().unwrap();
            let plan = compute_plan(&snapshot).unwrap();
            // Every rule seen is whole and sits under the one ruleset.
            let rules = snapshot.live(EntityKind::Rule).count();
            assert_eq!(plan.summary().create, rules + 1);
        }
    });

    let rules = store.list(EntityKind::Rule, Some(&ruleset.id)).unwrap();
    assert_eq!(rules.len(), WRITERS * RULES_PER_WRITER);
}

#[test]
fn reverting_an_edit_clears_the_marker() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    let editor = Editor::new(&store);
    let ruleset = editor
        .create_ruleset(&json!({"name": "Base", "description": "first"}))
        .unwrap();
    let mut sent = Entity::Ruleset(ruleset.clone());
    sent.set_remote_id("rs-1".to_string());
    store.commit_baseline(&[AppliedChange::Upserted(sent)]).unwrap();

    editor
        .update_ruleset(&ruleset.id, &json!({"name": "Base", "description": "second"}))
        .unwrap();
    assert_eq!(
        store.record(EntityKind::Ruleset, &ruleset.id).unwrap().unwrap().status,
        EntityStatus::Modified
    );

    editor
        .update_ruleset(&ruleset.id, &json!({"name": "Base", "description": "first"}))
        .unwrap();
    assert_eq!(
        store.record(EntityKind::Ruleset, &ruleset.id).unwrap().unwrap().status,
        EntityStatus::Unmodified
    );
}

#[test]
fn failed_batch_leaves_no_partial_edit() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    let ruleset = Ruleset::from_json(EntityId::new("rs-copy"), None, &json!({"name": "Copy"})).unwrap();
    let rule = Rule::from_json(
        EntityId::new("r-copy"),
        None,
        EntityId::new("rs-copy"),
        &json!({"name": "One", "type": "File"}),
    )
    .unwrap();

    // A stray file where the rule's directory belongs fails the second write.
    let mirror = store.layout().mirror().to_native();
    std::fs::create_dir_all(mirror.join("rs-copy")).unwrap();
    std::fs::write(mirror.join("rs-copy").join("r-copy"), "").unwrap();

    let err = store.put_new(vec![ruleset.into(), rule.into()]).unwrap_err();

    assert!(matches!(err, Error::Fs(_)));
    assert!(store.records().unwrap().is_empty());
    assert!(!mirror.join("rs-copy").exists());
}

#[test]
fn batch_rejects_taken_keys() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    let ruleset = Editor::new(&store).create_ruleset(&json!({"name": "Base"})).unwrap();
    let copy = Ruleset::from_json(ruleset.id.clone(), None, &json!({"name": "Other"})).unwrap();

    let err = store.put_new(vec![copy.into()]).unwrap_err();

    assert!(matches!(err, Error::Conflict { field: "ID", .. }));
    assert_eq!(store.list(EntityKind::Ruleset, None).unwrap().len(), 1);
}

#[test]
fn batch_gives_rules_empty_tags() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, ORG);
    let ruleset = Ruleset::from_json(EntityId::new("rs"), None, &json!({"name": "Base"})).unwrap();
    let rule = Rule::from_json(
        EntityId::new("r"),
        None,
        EntityId::new("rs"),
        &json!({"name": "One", "type": "File"}),
    )
    .unwrap();

    store.put_new(vec![ruleset.into(), rule.into()]).unwrap();

    let tags = store.get(EntityKind::Tags, &EntityId::new("r")).unwrap();
    assert_eq!(tags.content(), json!({}));
    assert_eq!(store.records().unwrap().len(), 3);
}
