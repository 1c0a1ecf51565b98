//! Resulting-state validation

use std::collections::HashMap;

use crate::model::{Entity, EntityKind};
use crate::store::Snapshot;
use crate::{Error, Result};

/// Check the live state a push would leave behind: names and remote IDs
/// unique per kind across the Organization, and every live rule owned by a
/// live ruleset.
pub(crate) fn validate_resulting_state(snapshot: &Snapshot) -> Result<()> {
    for kind in [EntityKind::Ruleset, EntityKind::Rule] {
        let mut names: HashMap<&str, &Entity> = HashMap::new();
        let mut remote_ids: HashMap<&str, &Entity> = HashMap::new();

        for entity in snapshot.live(kind) {
            if let Some(name) = entity.name()
                && names.insert(name, entity).is_some()
            {
                return Err(Error::conflict(kind, "name", name));
            }
            if let Some(remote_id) = entity.remote_id()
                && remote_ids.insert(remote_id, entity).is_some()
            {
                return Err(Error::conflict(kind, "remote ID", remote_id));
            }
        }
    }

    for entity in snapshot.live(EntityKind::Rule) {
        if let Entity::Rule(rule) = entity
            && !snapshot.is_live(EntityKind::Ruleset, &rule.ruleset_id)
        {
            return Err(Error::validation(format!(
                "rule '{}' belongs to ruleset '{}', which is deleted or missing",
                rule.name, rule.ruleset_id
            )));
        }
    }

    Ok(())
}
