//! # Read Views
//!
//! Plain, serializable snapshots of registry entities for presentation layers.
//! Views are built on demand and hold no links back into the registry, so a
//! UI can keep them around while the document keeps changing.

use crate::commands::object::inherited_property_sets;
use crate::error::Result;
use crate::hierarchy::HierarchyNode;
use crate::model::{AttributeId, DataType, Object, ObjectId, PropertySetId, ScriptId, ValueType};
use crate::store::Registry;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectView {
    pub id: ObjectId,
    pub name: String,
    pub identifier: String,
    pub label: String,
    pub is_concept: bool,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    pub property_sets: Vec<PropertySetId>,
    pub scripts: Vec<ScriptId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySetView {
    pub id: PropertySetId,
    pub name: String,
    pub object: Option<ObjectId>,
    pub parent: Option<PropertySetId>,
    pub attributes: Vec<AttributeView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeView {
    pub id: AttributeId,
    pub name: String,
    pub value: Vec<String>,
    pub value_type: ValueType,
    pub data_type: DataType,
    pub property_set: PropertySetId,
    /// Set when this attribute was cloned from another one.
    pub inherited_from: Option<AttributeId>,
    pub child_inherits_values: bool,
}

/// Text shown for an object in a tree widget: `"<name> (<identifier>)"`.
pub fn tree_label(object: &Object) -> String {
    format!("{} ({})", object.name, object.identifier)
}

pub fn object_view(registry: &Registry, id: ObjectId) -> Result<ObjectView> {
    let object = registry.object(id)?;
    Ok(ObjectView {
        id,
        name: object.name.clone(),
        identifier: object.identifier.clone(),
        label: tree_label(object),
        is_concept: object.is_concept,
        parent: object.parent(),
        children: object.children().to_vec(),
        property_sets: object.property_sets.clone(),
        scripts: object.scripts.clone(),
    })
}

pub fn attribute_view(registry: &Registry, id: AttributeId) -> Result<AttributeView> {
    let attribute = registry.attribute(id)?;
    Ok(AttributeView {
        id,
        name: attribute.name.clone(),
        value: attribute.value.clone(),
        value_type: attribute.value_type,
        data_type: attribute.data_type,
        property_set: attribute.property_set,
        inherited_from: attribute.parent(),
        child_inherits_values: attribute.child_inherits_values,
    })
}

pub fn property_set_view(registry: &Registry, id: PropertySetId) -> Result<PropertySetView> {
    let set = registry.property_set(id)?;
    let attributes = set
        .attributes
        .iter()
        .map(|a| attribute_view(registry, *a))
        .collect::<Result<Vec<_>>>()?;
    Ok(PropertySetView {
        id,
        name: set.name.clone(),
        object: set.object,
        parent: set.parent(),
        attributes,
    })
}

/// Objects without a parent, in creation order.
pub fn root_objects(registry: &Registry) -> Vec<ObjectId> {
    registry
        .objects()
        .filter(|(_, o)| o.parent().is_none())
        .map(|(id, _)| id)
        .collect()
}

/// Every attribute visible on `object`, grouped by property set: the object's
/// own sets first, then those of its ancestors, nearest first.
pub fn attributes_by_property_set(
    registry: &Registry,
    object: ObjectId,
) -> Result<IndexMap<PropertySetId, Vec<AttributeView>>> {
    let mut sets = registry.object(object)?.property_sets.clone();
    for inherited in inherited_property_sets(registry, object)?.into_values() {
        sets.extend(inherited);
    }

    let mut out = IndexMap::new();
    for set in sets {
        out.insert(set, property_set_view(registry, set)?.attributes);
    }
    Ok(out)
}

/// Looks up one of `object`'s own property sets by name. The first match wins.
pub fn property_set_by_name(
    registry: &Registry,
    object: ObjectId,
    name: &str,
) -> Result<Option<PropertySetId>> {
    let object = registry.object(object)?;
    Ok(object.property_sets.iter().copied().find(|id| {
        registry
            .property_set(*id)
            .map(|s| s.name == name)
            .unwrap_or(false)
    }))
}
