//! # Objects
//!
//! Objects form the category tree and key the registry by identifier.
//!
//! Object-level inheritance is read-only: a child object *sees* the property
//! sets of its ancestors through [`inherited_property_sets`], nothing is
//! copied. This is independent of the property-set structural inheritance in
//! [`crate::commands::property_set`]; reparenting an object does not touch any
//! property-set links.
//!
//! ## Deletion
//!
//! Deleting an object always frees its identifier and lifts its child objects
//! to its own parent (or makes them roots). What happens to the property sets
//! and scripts it owns is decided by [`ObjectDeletePolicy`].

use super::property_set;
use super::script;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::ObjectDeletePolicy;
use crate::error::{Result, SchemaError};
use crate::hierarchy::HierarchyNode;
use crate::model::{Object, ObjectId, PropertySetId};
use crate::store::Registry;
use indexmap::IndexMap;

/// Creates and registers an object. Fails if `identifier` is taken.
pub fn create(
    registry: &mut Registry,
    name: String,
    identifier: String,
    parent: Option<ObjectId>,
) -> Result<ObjectId> {
    registry.ensure_identifier_free(&identifier)?;
    if let Some(parent) = parent {
        registry.objects.get(parent)?;
    }

    let id = registry
        .objects
        .insert(Object::new(name, identifier.clone(), false));
    registry.register_identifier(identifier, id)?;

    if let Some(parent) = parent {
        registry.objects.add_child(parent, id)?;
        registry.mark_object(parent);
    }

    tracing::debug!(object = %id, ?parent, "created object");
    Ok(id)
}

/// Moves `object` under `new_parent`, or makes it a root when `None`.
pub fn reparent(
    registry: &mut Registry,
    object: ObjectId,
    new_parent: Option<ObjectId>,
) -> Result<CmdResult> {
    let current = registry.objects.parent_of(object)?;
    if let Some(new_parent) = new_parent {
        registry.objects.ensure_acyclic(object, new_parent)?;
    }

    let mut result = CmdResult::default();
    if current == new_parent {
        result.add_message(CmdMessage::info(format!("{object} is already in place")));
        return Ok(result);
    }

    match new_parent {
        Some(new_parent) => registry.objects.add_child(new_parent, object)?,
        None => {
            registry.objects.detach(object)?;
        }
    }

    for touched in [current, Some(object), new_parent].into_iter().flatten() {
        registry.mark_object(touched);
        result.touch(touched);
    }
    Ok(result)
}

pub fn rename(registry: &mut Registry, object: ObjectId, name: String) -> Result<CmdResult> {
    let record = registry.objects.get_mut(object)?;
    record.name = name;
    record.changed = true;

    let mut result = CmdResult::default();
    result.touch(object);
    Ok(result)
}

/// Re-keys `object` under a new identifier.
pub fn set_identifier(
    registry: &mut Registry,
    object: ObjectId,
    identifier: String,
) -> Result<CmdResult> {
    let current = registry.objects.get(object)?.identifier.clone();
    let mut result = CmdResult::default();
    if current == identifier {
        return Ok(result);
    }
    registry.ensure_identifier_free(&identifier)?;

    registry.release_identifier(&current);
    registry.register_identifier(identifier.clone(), object)?;
    let record = registry.objects.get_mut(object)?;
    record.identifier = identifier;
    record.changed = true;
    result.touch(object);
    Ok(result)
}

pub fn set_concept(registry: &mut Registry, object: ObjectId, is_concept: bool) -> Result<CmdResult> {
    let record = registry.objects.get_mut(object)?;
    record.is_concept = is_concept;
    record.changed = true;

    let mut result = CmdResult::default();
    result.touch(object);
    Ok(result)
}

/// Property sets owned by each ancestor of `object`, nearest ancestor first.
/// Ancestors without property sets are omitted.
pub fn inherited_property_sets(
    registry: &Registry,
    object: ObjectId,
) -> Result<IndexMap<ObjectId, Vec<PropertySetId>>> {
    let mut out = IndexMap::new();
    for ancestor in registry.objects.ancestors(object)? {
        let record = registry.objects.get(ancestor)?;
        if !record.property_sets.is_empty() {
            out.insert(ancestor, record.property_sets.clone());
        }
    }
    Ok(out)
}

/// Makes `object` the owner of `set`, moving it from its previous owner.
pub fn add_property_set(
    registry: &mut Registry,
    object: ObjectId,
    set: PropertySetId,
) -> Result<CmdResult> {
    registry.objects.get(object)?;
    let previous = registry.property_sets.get(set)?.object;

    let mut result = CmdResult::default();
    if previous == Some(object) {
        result.add_message(CmdMessage::info(format!("{set} already belongs to {object}")));
        return Ok(result);
    }

    if let Some(previous) = previous {
        if let Ok(owner) = registry.objects.get_mut(previous) {
            owner.property_sets.retain(|p| *p != set);
            owner.changed = true;
            result.touch(previous);
        }
    }

    let owner = registry.objects.get_mut(object)?;
    owner.property_sets.push(set);
    owner.changed = true;
    let record = registry.property_sets.get_mut(set)?;
    record.object = Some(object);
    record.changed = true;

    result.touch(object);
    result.touch(set);
    Ok(result)
}

/// Detaches `set` from `object` without deleting it.
pub fn remove_property_set(
    registry: &mut Registry,
    object: ObjectId,
    set: PropertySetId,
) -> Result<CmdResult> {
    let owner = registry.objects.get(object)?;
    registry.property_sets.get(set)?;
    if !owner.property_sets.contains(&set) {
        return Err(SchemaError::NotAMember {
            item: set.into(),
            container: object.into(),
        });
    }

    let owner = registry.objects.get_mut(object)?;
    owner.property_sets.retain(|p| *p != set);
    owner.changed = true;
    let record = registry.property_sets.get_mut(set)?;
    record.object = None;
    record.changed = true;

    let mut result = CmdResult::default();
    result.touch(object);
    result.touch(set);
    Ok(result)
}

/// Deletes `object` and frees its identifier.
pub fn delete(
    registry: &mut Registry,
    object: ObjectId,
    policy: ObjectDeletePolicy,
) -> Result<CmdResult> {
    let record = registry.objects.get(object)?;
    let identifier = record.identifier.clone();
    let sets = record.property_sets.clone();
    let scripts = record.scripts.clone();
    let parent = record.parent();
    let children = record.children().to_vec();

    let mut result = CmdResult::default();

    match policy {
        ObjectDeletePolicy::Cascade => {
            for set in sets {
                result.merge(property_set::delete(registry, set)?);
            }
            for id in scripts {
                result.merge(script::delete(registry, id)?);
            }
        }
        ObjectDeletePolicy::Orphan => {
            for set in sets {
                if let Ok(s) = registry.property_sets.get_mut(set) {
                    s.object = None;
                    s.changed = true;
                    result.touch(set);
                }
            }
            for id in scripts {
                if let Ok(s) = registry.scripts.get_mut(id) {
                    s.object = None;
                    s.changed = true;
                    result.touch(id);
                }
            }
        }
    }

    for child in children {
        match parent {
            Some(parent) => registry.objects.add_child(parent, child)?,
            None => {
                registry.objects.detach(child)?;
            }
        }
        registry.mark_object(child);
        result.touch(child);
    }

    if let Some(parent) = registry.objects.detach(object)? {
        registry.mark_object(parent);
        result.touch(parent);
    }

    registry.release_identifier(&identifier);
    registry.objects.remove(object);
    registry.note_removal();
    result.touch(object);

    tracing::debug!(%object, ?policy, "deleted object");
    Ok(result)
}
