//! # Attribute Setters and Cascades
//!
//! Attributes inherit structurally: a clone's structural parent is the
//! attribute it was copied from. Setters differ in how far they reach.
//!
//! | Setter | Local write | Cascade to clones |
//! |--------|-------------|-------------------|
//! | `set_value` | unless locked by an ancestor | never |
//! | `set_name` | only on a root | always, from the target down |
//! | `set_value_type` | only on a root | always, from the target down |
//! | `set_data_type` | only on a root | always, from the target down |
//!
//! ## Root-Only Writes
//!
//! Name and type writes are durable only when made at the root of a chain.
//! Invoked on a clone, the setter leaves the clone's own field untouched but
//! still overwrites every clone below it:
//!
//! ```text
//! set_name(mid, "B")   root:"A" ─ mid:"A" ─ leaf:"B"
//! set_name(root, "B")  root:"B" ─ mid:"B" ─ leaf:"B"
//! ```
//!
//! ## Value Lock
//!
//! An attribute with `child_inherits_values` set locks the values of all of
//! its clones. A value write to a locked clone is dropped. By default it is
//! reported as a warning message; with `EngineConfig::strict_value_lock` it
//! fails with [`SchemaError::LockedValue`].
//!
//! Values are copied once when a clone is created and are never cascaded
//! afterwards.

use super::helpers::{delete_attribute_tree, value_lock_holder};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::EngineConfig;
use crate::error::{Result, SchemaError};
use crate::hierarchy::HierarchyNode;
use crate::model::{expand_values, Attribute, AttributeId, DataType, ValueType};
use crate::store::Registry;

/// Replaces the value list of `attribute` with the delimiter expansion of
/// `values`. Clones are not updated.
pub fn set_value<I, S>(
    registry: &mut Registry,
    config: &EngineConfig,
    attribute: AttributeId,
    values: I,
) -> Result<CmdResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    registry.attributes.get(attribute)?;

    let mut result = CmdResult::default();
    if let Some(holder) = value_lock_holder(registry, attribute)? {
        if config.strict_value_lock {
            return Err(SchemaError::LockedValue(attribute));
        }
        tracing::warn!(%attribute, %holder, "dropped write to locked attribute value");
        result.add_message(CmdMessage::warning(format!(
            "Value of {attribute} is locked by {holder}"
        )));
        return Ok(result);
    }

    let record = registry.attributes.get_mut(attribute)?;
    record.value = expand_values(values, config.value_delimiter);
    record.changed = true;
    result.touch(attribute);
    Ok(result)
}

pub fn set_name(registry: &mut Registry, attribute: AttributeId, name: String) -> Result<CmdResult> {
    write_from_root(registry, attribute, |a| a.name = name.clone())
}

pub fn set_value_type(
    registry: &mut Registry,
    attribute: AttributeId,
    value_type: ValueType,
) -> Result<CmdResult> {
    write_from_root(registry, attribute, |a| a.value_type = value_type)
}

pub fn set_data_type(
    registry: &mut Registry,
    attribute: AttributeId,
    data_type: DataType,
) -> Result<CmdResult> {
    write_from_root(registry, attribute, |a| a.data_type = data_type)
}

/// Applies `write` to `attribute` if it is not a clone, and to every
/// structural descendant regardless.
fn write_from_root<F>(registry: &mut Registry, attribute: AttributeId, write: F) -> Result<CmdResult>
where
    F: Fn(&mut Attribute),
{
    let record = registry.attributes.get(attribute)?;
    let is_child = record.is_child();
    let is_parent = record.is_parent();

    let mut result = CmdResult::default();
    if !is_child {
        let record = registry.attributes.get_mut(attribute)?;
        write(&mut *record);
        record.changed = true;
        result.touch(attribute);
    }

    if is_parent {
        for descendant in registry.attributes.descendants(attribute)? {
            let record = registry.attributes.get_mut(descendant)?;
            write(&mut *record);
            record.changed = true;
            result.touch(descendant);
        }
        tracing::debug!(%attribute, cascaded = result.affected.len(), "pushed attribute change to clones");
    }

    Ok(result)
}

/// Sets the lock flag that freezes the values of all clones below `attribute`.
pub fn set_child_inherits_values(
    registry: &mut Registry,
    attribute: AttributeId,
    locked: bool,
) -> Result<CmdResult> {
    let record = registry.attributes.get_mut(attribute)?;
    record.child_inherits_values = locked;
    record.changed = true;

    let mut result = CmdResult::default();
    result.touch(attribute);
    Ok(result)
}

/// Removes `attribute` from its property set and deletes all of its clones.
pub fn delete(registry: &mut Registry, attribute: AttributeId) -> Result<CmdResult> {
    let removed = delete_attribute_tree(registry, attribute)?;
    Ok(CmdResult::default().with_affected(removed.into_iter().map(Into::into).collect()))
}

/// Structural equality: same name, same values, and owning property sets
/// with the same name.
pub fn is_equal(registry: &Registry, a: AttributeId, b: AttributeId) -> Result<bool> {
    let left = registry.attributes.get(a)?;
    let right = registry.attributes.get(b)?;
    if left.name != right.name || left.value != right.value {
        return Ok(false);
    }
    let left_set = registry.property_sets.get(left.property_set)?;
    let right_set = registry.property_sets.get(right.property_set)?;
    Ok(left_set.name == right_set.name)
}
