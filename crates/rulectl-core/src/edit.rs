//! Entity editing
//!
//! Higher-level edits built from [`LocalStore::put`] and
//! [`LocalStore::delete`]: creating entities from user documents under
//! fresh local keys, updating them in place, and copying rules and rulesets
//! within or across workspaces.

use serde_json::Value;

use crate::model::{Entity, EntityId, EntityKind, Rule, Ruleset, TagSet};
use crate::store::LocalStore;
use crate::{Error, Result};

/// Suffix appended to copied names when no name is given.
pub const COPY_SUFFIX: &str = " - COPY";

/// Stages edits into one workspace.
#[derive(Debug, Clone, Copy)]
pub struct Editor<'a> {
    store: &'a LocalStore,
}

impl<'a> Editor<'a> {
    pub fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    pub fn create_ruleset(&self, doc: &Value) -> Result<Ruleset> {
        let ruleset = Ruleset::from_json(EntityId::generate_local(), None, doc)?;
        self.store.put(ruleset.clone().into())?;
        Ok(ruleset)
    }

    /// Replace a ruleset's name and metadata, keeping its identity.
    pub fn update_ruleset(&self, id: &EntityId, doc: &Value) -> Result<Ruleset> {
        let existing = get_ruleset(self.store, id)?;
        let ruleset = Ruleset::from_json(id.clone(), existing.remote_id, doc)?;
        self.store.put(ruleset.clone().into())?;
        Ok(ruleset)
    }

    pub fn delete_ruleset(&self, id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::Ruleset, id)
    }

    /// Create a rule in `ruleset` with an empty tag-set.
    pub fn create_rule(&self, ruleset: &EntityId, doc: &Value) -> Result<Rule> {
        let rule = Rule::from_json(EntityId::generate_local(), None, ruleset.clone(), doc)?;
        self.store.put(rule.clone().into())?;
        Ok(rule)
    }

    /// Replace a rule's name and body, keeping its identity and ruleset.
    pub fn update_rule(&self, id: &EntityId, doc: &Value) -> Result<Rule> {
        let existing = get_rule(self.store, id)?;
        let rule = Rule::from_json(id.clone(), existing.remote_id, existing.ruleset_id, doc)?;
        self.store.put(rule.clone().into())?;
        Ok(rule)
    }

    pub fn delete_rule(&self, id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::Rule, id)
    }

    /// Replace a rule's tags with the flat map in `doc`.
    pub fn update_tags(&self, rule: &EntityId, doc: &Value) -> Result<TagSet> {
        let tags = TagSet::from_json(rule.clone(), doc)?;
        self.store.put(tags.clone().into())?;
        Ok(tags)
    }

    /// Copy a rule and its tags, into `target_ruleset` or its own ruleset.
    /// The copy is named `name`, or `"<name> - COPY"`.
    pub fn copy_rule(
        &self,
        id: &EntityId,
        target_ruleset: Option<&EntityId>,
        name: Option<&str>,
    ) -> Result<Rule> {
        let source = get_rule(self.store, id)?;
        let ruleset = target_ruleset.cloned().unwrap_or_else(|| source.ruleset_id.clone());
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}{COPY_SUFFIX}", source.name));
        copy_rule_into(self.store, self.store, &source, &ruleset, name)
    }

    /// Copy a rule and its tags into a ruleset of another workspace,
    /// keeping its name.
    pub fn copy_rule_to(
        &self,
        id: &EntityId,
        target: &LocalStore,
        target_ruleset: &EntityId,
    ) -> Result<Rule> {
        let source = get_rule(self.store, id)?;
        let name = source.name.clone();
        copy_rule_into(self.store, target, &source, target_ruleset, name)
    }

    /// Copy a ruleset and all of its rules within this workspace.
    ///
    /// The ruleset is named `name`, or `"<name> - COPY"`; each rule gets the
    /// suffix `" - <name>"`, or `" - COPY"`. The copy is staged as one batch:
    /// on any failure nothing is written.
    pub fn copy_ruleset(&self, id: &EntityId, name: Option<&str>) -> Result<Ruleset> {
        let source = get_ruleset(self.store, id)?;
        let (ruleset_name, suffix) = match name {
            Some(name) => (name.to_string(), format!(" - {name}")),
            None => (format!("{}{COPY_SUFFIX}", source.name), COPY_SUFFIX.to_string()),
        };
        copy_ruleset_into(self.store, self.store, &source, ruleset_name, |rule| {
            format!("{rule}{suffix}")
        })
    }

    /// Copy a ruleset and all of its rules into another workspace, keeping
    /// every name.
    pub fn copy_ruleset_to(&self, id: &EntityId, target: &LocalStore) -> Result<Ruleset> {
        let source = get_ruleset(self.store, id)?;
        let name = source.name.clone();
        copy_ruleset_into(self.store, target, &source, name, str::to_string)
    }
}

fn get_ruleset(store: &LocalStore, id: &EntityId) -> Result<Ruleset> {
    match store.get(EntityKind::Ruleset, id)? {
        Entity::Ruleset(ruleset) => Ok(ruleset),
        _ => Err(Error::not_found(EntityKind::Ruleset, id)),
    }
}

fn get_rule(store: &LocalStore, id: &EntityId) -> Result<Rule> {
    match store.get(EntityKind::Rule, id)? {
        Entity::Rule(rule) => Ok(rule),
        _ => Err(Error::not_found(EntityKind::Rule, id)),
    }
}

fn copy_rule_into(
    source_store: &LocalStore,
    target: &LocalStore,
    source: &Rule,
    ruleset: &EntityId,
    name: String,
) -> Result<Rule> {
    let (rule, tags) = rule_copy(source_store, source, ruleset, name)?;
    let mut batch = vec![Entity::Rule(rule.clone())];
    batch.extend(tags.map(Entity::Tags));
    target.put_new(batch)?;

    tracing::debug!(from = %source.id, to = %rule.id, workspace = %target.workspace(), "Rule copied");
    Ok(rule)
}

/// A renamed copy of `source` under a fresh key in `ruleset`, with a copy
/// of its tags when it has any.
fn rule_copy(
    source_store: &LocalStore,
    source: &Rule,
    ruleset: &EntityId,
    name: String,
) -> Result<(Rule, Option<TagSet>)> {
    let mut doc = source.to_document();
    if let Value::Object(map) = &mut doc {
        map.insert("name".into(), Value::String(name));
    }
    let rule = Rule::from_json(EntityId::generate_local(), None, ruleset.clone(), &doc)?;

    let tags = match source_store.get(EntityKind::Tags, &source.id)? {
        Entity::Tags(tags) if !tags.is_empty() => Some(TagSet {
            rule_id: rule.id.clone(),
            tags: tags.tags,
        }),
        _ => None,
    };
    Ok((rule, tags))
}

fn copy_ruleset_into(
    source_store: &LocalStore,
    target: &LocalStore,
    source: &Ruleset,
    name: String,
    rename_rule: impl Fn(&str) -> String,
) -> Result<Ruleset> {
    let rules: Vec<Rule> = source_store
        .list(EntityKind::Rule, Some(&source.id))?
        .into_iter()
        .filter_map(|e| match e {
            Entity::Rule(rule) => Some(rule),
            _ => None,
        })
        .collect();

    let mut doc = source.to_payload();
    if let Value::Object(map) = &mut doc {
        map.insert("name".into(), Value::String(name));
    }
    let ruleset = Ruleset::from_json(EntityId::generate_local(), None, &doc)?;

    let mut batch = vec![Entity::Ruleset(ruleset.clone())];
    for rule in &rules {
        let (copy, tags) = rule_copy(source_store, rule, &ruleset.id, rename_rule(&rule.name))?;
        batch.push(copy.into());
        batch.extend(tags.map(Entity::Tags));
    }
    target.put_new(batch)?;

    tracing::debug!(
        from = %source.id,
        to = %ruleset.id,
        rules = rules.len(),
        workspace = %target.workspace(),
        "Ruleset copied"
    );
    Ok(ruleset)
}
