//! Diff/Plan engine behaviour over hand-built snapshots

use pretty_assertions::assert_eq;
use rulectl_core::model::{Entity, EntityId, EntityKind, Rule, Ruleset, TagSet};
use rulectl_core::plan::{ChangeKind, compute_plan};
use rulectl_core::store::{Baseline, EntityStatus, Record, Snapshot};
use rulectl_core::Error;
use serde_json::json;

fn synced_ruleset(id: &str, name: &str) -> Entity {
    Ruleset::from_remote(&json!({"id": id, "name": name})).unwrap().into()
}

fn synced_rule(id: &str, ruleset: &str, name: &str) -> Entity {
    Rule::from_remote(EntityId::new(ruleset), &json!({"id": id, "name": name, "type": "File"}))
        .unwrap()
        .into()
}

fn local_ruleset(id: &str, name: &str) -> Entity {
    Ruleset::from_json(EntityId::new(id), None, &json!({"name": name}))
        .unwrap()
        .into()
}

fn local_rule(id: &str, ruleset: &str, name: &str) -> Entity {
    Rule::from_json(EntityId::new(id), None, EntityId::new(ruleset), &json!({"name": name, "type": "File"}))
        .unwrap()
        .into()
}

fn tags(rule: &str, doc: serde_json::Value) -> Entity {
    TagSet::from_json(EntityId::new(rule), &doc).unwrap().into()
}

fn live(entity: Entity) -> Record {
    Record::new(EntityStatus::Unmodified, entity)
}

fn tombstone(entity: Entity) -> Record {
    Record::new(EntityStatus::Deleted, entity)
}

fn baseline_of(entities: &[Entity]) -> Baseline {
    let mut baseline = Baseline::new("org");
    for entity in entities {
        baseline.record(entity);
    }
    baseline
}

#[test]
fn unchanged_snapshot_yields_empty_plan() {
    let rs = synced_ruleset("rs-1", "Base");
    let rule = synced_rule("r-1", "rs-1", "One");
    let snapshot = Snapshot::new(
        "org",
        vec![live(rs.clone()), live(rule.clone())],
        baseline_of(&[rs, rule]),
    );

    let plan = compute_plan(&snapshot).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.to_string(), "No changes. Workspace org is up to date.");
}

#[test]
fn changes_follow_dependency_order() {
    let kept = synced_ruleset("rs-a", "Kept");
    let gone = synced_ruleset("rs-b", "Gone");
    let old_rule = synced_rule("r-old", "rs-a", "Old");
    let gone_rule = synced_rule("r-gone", "rs-b", "In gone");
    let tagged = synced_rule("r-tagged", "rs-a", "Tagged");
    let baseline = baseline_of(&[kept.clone(), gone.clone(), old_rule.clone(), gone_rule.clone(), tagged.clone()]);

    let renamed = synced_ruleset("rs-a", "Kept renamed");
    let snapshot = Snapshot::new(
        "org",
        vec![
            live(renamed),
            tombstone(gone),
            tombstone(old_rule),
            tombstone(gone_rule),
            live(tagged),
            live(tags("r-tagged", json!({"env": "prod"}))),
            live(local_ruleset("c-localonly", "New")),
            live(local_rule("n-localonly", "c-localonly", "New rule")),
        ],
        baseline,
    );

    let plan = compute_plan(&snapshot).unwrap();
    let order: Vec<(ChangeKind, EntityKind, String)> = plan
        .iter()
        .map(|c| (c.kind, c.entity_type, c.target.to_string()))
        .collect();

    assert_eq!(
        order,
        vec![
            (ChangeKind::Delete, EntityKind::Rule, "r-gone".to_string()),
            (ChangeKind::Delete, EntityKind::Rule, "r-old".to_string()),
            (ChangeKind::Delete, EntityKind::Ruleset, "rs-b".to_string()),
            (ChangeKind::Create, EntityKind::Ruleset, "c-localonly".to_string()),
            (ChangeKind::Update, EntityKind::Ruleset, "rs-a".to_string()),
            (ChangeKind::Create, EntityKind::Rule, "n-localonly".to_string()),
            (ChangeKind::Create, EntityKind::Tags, "r-tagged".to_string()),
        ]
    );
}

#[test]
fn delete_carries_parent_remote_id() {
    let rs = synced_ruleset("rs-1", "Base");
    let rule = synced_rule("r-1", "rs-1", "One");
    let snapshot = Snapshot::new(
        "org",
        vec![live(rs.clone()), tombstone(rule.clone())],
        baseline_of(&[rs, rule]),
    );

    let plan = compute_plan(&snapshot).unwrap();
    assert_eq!(plan.len(), 1);
    let change = &plan.changes[0];
    assert_eq!(change.kind, ChangeKind::Delete);
    assert_eq!(change.remote_id.as_deref(), Some("r-1"));
    assert_eq!(change.parent_remote_id.as_deref(), Some("rs-1"));
    assert_eq!(change.name.as_deref(), Some("One"));
}

#[test]
fn rule_under_new_ruleset_has_no_parent_remote_id_yet() {
    let snapshot = Snapshot::new(
        "org",
        vec![
            live(local_ruleset("a-localonly", "New")),
            live(local_rule("b-localonly", "a-localonly", "Rule")),
        ],
        Baseline::new("org"),
    );

    let plan = compute_plan(&snapshot).unwrap();
    let rule_change = plan
        .iter()
        .find(|c| c.entity_type == EntityKind::Rule)
        .unwrap();
    assert_eq!(rule_change.parent_remote_id, None);
    assert_eq!(rule_change.parent, Some(EntityId::new("a-localonly")));
}

#[test]
fn unsynced_empty_tags_produce_no_change() {
    let snapshot = Snapshot::new(
        "org",
        vec![
            live(local_ruleset("a-localonly", "New")),
            live(local_rule("b-localonly", "a-localonly", "Rule")),
            live(tags("b-localonly", json!({}))),
        ],
        Baseline::new("org"),
    );

    let plan = compute_plan(&snapshot).unwrap();
    assert!(plan.iter().all(|c| c.entity_type != EntityKind::Tags));
}

#[test]
fn clearing_synced_tags_is_an_update() {
    let rs = synced_ruleset("rs-1", "Base");
    let rule = synced_rule("r-1", "rs-1", "One");
    let old_tags = tags("r-1", json!({"env": "prod"}));
    let snapshot = Snapshot::new(
        "org",
        vec![live(rs.clone()), live(rule.clone()), live(tags("r-1", json!({})))],
        baseline_of(&[rs, rule, old_tags]),
    );

    let plan = compute_plan(&snapshot).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.changes[0].kind, ChangeKind::Update);
    assert_eq!(plan.changes[0].entity_type, EntityKind::Tags);
    assert_eq!(plan.changes[0].parent_remote_id.as_deref(), Some("r-1"));
}

#[test]
fn volatile_fields_do_not_cause_updates() {
    let rs = synced_ruleset("rs-1", "Base");
    let before = Rule::from_remote(
        EntityId::new("rs-1"),
        &json!({"id": "r-1", "name": "One", "type": "File", "updatedAt": "2020"}),
    )
    .unwrap();
    let after = Rule::from_remote(
        EntityId::new("rs-1"),
        &json!({"id": "r-1", "name": "One", "type": "File", "updatedAt": "2024"}),
    )
    .unwrap();
    let snapshot = Snapshot::new(
        "org",
        vec![live(rs.clone()), live(after.into())],
        baseline_of(&[rs, before.into()]),
    );

    assert!(compute_plan(&snapshot).unwrap().is_empty());
}

#[test]
fn duplicate_rule_names_across_rulesets_conflict() {
    let snapshot = Snapshot::new(
        "org",
        vec![
            live(local_ruleset("a-localonly", "A")),
            live(local_ruleset("b-localonly", "B")),
            live(local_rule("c-localonly", "a-localonly", "Same")),
            live(local_rule("d-localonly", "b-localonly", "Same")),
        ],
        Baseline::new("org"),
    );

    let err = compute_plan(&snapshot).unwrap_err();
    assert!(matches!(
        err,
        Error::Conflict {
            kind: EntityKind::Rule,
            field: "name",
            ..
        }
    ));
}

#[test]
fn live_rule_under_deleted_ruleset_is_invalid() {
    let rs = synced_ruleset("rs-1", "Base");
    let rule = synced_rule("r-1", "rs-1", "One");
    let snapshot = Snapshot::new(
        "org",
        vec![tombstone(rs.clone()), live(rule.clone())],
        baseline_of(&[rs, rule]),
    );

    assert!(matches!(compute_plan(&snapshot), Err(Error::Validation { .. })));
}

#[test]
fn plan_renders_and_serializes() {
    let snapshot = Snapshot::new(
        "org",
        vec![live(local_ruleset("a-localonly", "New"))],
        Baseline::new("org"),
    );
    let plan = compute_plan(&snapshot).unwrap();

    let text = plan.to_string();
    assert!(text.starts_with("Plan for workspace org: 1 to create, 0 to update, 0 to delete"));
    assert!(text.contains("+ ruleset \"New\" (a-localonly)"));

    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["workspace"], "org");
    assert_eq!(value["changes"][0]["kind"], "create");
    assert_eq!(value["changes"][0]["entity_type"], "ruleset");
}
