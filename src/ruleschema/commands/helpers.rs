//! Cascades shared by the property-set and attribute commands.

use crate::error::Result;
use crate::model::{AttributeId, PropertySetId};
use crate::store::Registry;
use std::collections::{HashSet, VecDeque};

/// Clones `source` into `target` and links the clone under `source`.
pub(crate) fn clone_attribute_into(
    registry: &mut Registry,
    source: AttributeId,
    target: PropertySetId,
) -> Result<AttributeId> {
    let record = registry.attributes.get(source)?.clone_into(target);
    registry.property_sets.get(target)?;

    let clone = registry.attributes.insert(record);
    registry.attributes.add_child(source, clone)?;

    let set = registry.property_sets.get_mut(target)?;
    set.attributes.push(clone);
    set.changed = true;
    Ok(clone)
}

/// Clones `attribute`, owned by `owner`, into every property set below
/// `owner`. Each clone's structural parent is the clone one level up, so a
/// three-level property-set chain yields a three-level attribute chain.
pub(crate) fn propagate_to_children(
    registry: &mut Registry,
    attribute: AttributeId,
    owner: PropertySetId,
) -> Result<Vec<AttributeId>> {
    let mut created = Vec::new();
    let mut seen = HashSet::from([owner]);
    let mut queue = VecDeque::from([(attribute, owner)]);

    while let Some((source, set)) = queue.pop_front() {
        for child in registry.property_sets.children_of(set)? {
            if !seen.insert(child) {
                continue;
            }
            let clone = clone_attribute_into(registry, source, child)?;
            created.push(clone);
            queue.push_back((clone, child));
        }
    }

    if !created.is_empty() {
        tracing::debug!(%attribute, clones = created.len(), "propagated attribute to child property sets");
    }
    Ok(created)
}

/// Deletes `attribute` and all of its structural descendants.
///
/// Returns the removed ids, `attribute` first.
pub(crate) fn delete_attribute_tree(
    registry: &mut Registry,
    attribute: AttributeId,
) -> Result<Vec<AttributeId>> {
    let mut doomed = vec![attribute];
    doomed.extend(registry.attributes.descendants(attribute)?);
    registry.attributes.detach(attribute)?;

    for id in &doomed {
        if let Some(record) = registry.attributes.remove(*id) {
            if let Ok(set) = registry.property_sets.get_mut(record.property_set) {
                set.attributes.retain(|a| a != id);
                set.changed = true;
            }
        }
    }

    registry.note_removal();
    tracing::debug!(%attribute, removed = doomed.len(), "deleted attribute with its clones");
    Ok(doomed)
}

/// Removes a single attribute record without touching its clones. The clones
/// lose their structural parent and become roots.
///
/// Returns the orphaned clones.
pub(crate) fn release_attribute(
    registry: &mut Registry,
    attribute: AttributeId,
) -> Result<Vec<AttributeId>> {
    registry.attributes.detach(attribute)?;
    let orphans = registry.attributes.orphan_children(attribute)?;
    for orphan in &orphans {
        if let Ok(a) = registry.attributes.get_mut(*orphan) {
            a.changed = true;
        }
    }
    registry.attributes.remove(attribute);
    registry.note_removal();
    Ok(orphans)
}

/// The nearest structural ancestor that locks `attribute`'s value, if any.
pub(crate) fn value_lock_holder(
    registry: &Registry,
    attribute: AttributeId,
) -> Result<Option<AttributeId>> {
    let ancestors = registry.attributes.ancestors(attribute)?;
    Ok(ancestors.into_iter().find(|id| {
        registry
            .attributes
            .get(*id)
            .map(|a| a.child_inherits_values)
            .unwrap_or(false)
    }))
}
