//! # Property Sets and Structural Inheritance
//!
//! A property set may be parented onto another property set (usually one owned
//! by an object higher up the object tree). Parenting makes the receiver a
//! *dependent* set:
//!
//! 1. **On parenting**: every attribute of the parent is cloned into the
//!    receiver, and each clone's structural parent is its source.
//! 2. **Late additions**: an attribute added to a set is cloned into every set
//!    below it, level by level.
//! 3. **Removals**: removing an attribute removes its clones below.
//! 4. **Re-parenting**: clones of the old parent's attributes are dropped
//!    before the new parent's attributes are cloned in. Attributes defined
//!    locally on the receiver survive.
//!
//! ```text
//! Q: [Material, Colour]          Q: [Material, Colour, Fire]
//!  └── P: [Material', Colour']    └── P: [Material', Colour', Fire']   (add Fire to Q)
//! ```
//!
//! Clones copy values once, at creation. Later value edits stay local; name and
//! type edits cascade (see [`crate::commands::attribute`]).

use super::helpers::{
    clone_attribute_into, delete_attribute_tree, propagate_to_children, release_attribute,
};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::EngineConfig;
use crate::error::{Result, SchemaError};
use crate::hierarchy::HierarchyNode;
use crate::model::{
    expand_values, Attribute, AttributeId, DataType, ObjectId, PropertySet, PropertySetId,
    ValueType,
};
use crate::store::Registry;
use indexmap::IndexMap;

/// Input for [`add_attribute`]. Unset types fall back to the config defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttribute {
    pub name: String,
    pub value: Vec<String>,
    pub value_type: Option<ValueType>,
    pub data_type: Option<DataType>,
}

impl NewAttribute {
    pub fn new(name: impl Into<String>, value: Vec<String>) -> Self {
        Self {
            name: name.into(),
            value,
            value_type: None,
            data_type: None,
        }
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }
}

/// Creates a property set on `object`, optionally parented onto `parent`.
pub fn create(
    registry: &mut Registry,
    object: ObjectId,
    name: String,
    parent: Option<PropertySetId>,
) -> Result<PropertySetId> {
    registry.objects.get(object)?;
    if let Some(parent) = parent {
        registry.property_sets.get(parent)?;
    }

    let mut record = PropertySet::new(name);
    record.object = Some(object);
    let id = registry.property_sets.insert(record);

    let owner = registry.objects.get_mut(object)?;
    owner.property_sets.push(id);
    owner.changed = true;

    if let Some(parent) = parent {
        attach_parent(registry, id, parent)?;
    }

    tracing::debug!(property_set = %id, %object, "created property set");
    Ok(id)
}

/// Parents `set` onto `parent`, cloning the parent's attributes into it.
///
/// A set that already has a different parent is re-parented as by
/// [`change_parent`].
pub fn set_parent(
    registry: &mut Registry,
    set: PropertySetId,
    parent: PropertySetId,
) -> Result<CmdResult> {
    registry.property_sets.get(set)?;
    registry.property_sets.ensure_acyclic(set, parent)?;

    match registry.property_sets.parent_of(set)? {
        Some(current) if current == parent => {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info(format!(
                "{set} already inherits from {parent}"
            )));
            Ok(result)
        }
        Some(_) => change_parent(registry, set, Some(parent)),
        None => attach_parent(registry, set, parent),
    }
}

/// Moves `set` to `new_parent`, or detaches it when `None`.
///
/// Attributes of `set` cloned from the current parent are deleted (with their
/// own clones further down) before the new parent's attributes are cloned in.
pub fn change_parent(
    registry: &mut Registry,
    set: PropertySetId,
    new_parent: Option<PropertySetId>,
) -> Result<CmdResult> {
    let current = registry.property_sets.parent_of(set)?;
    if let Some(new_parent) = new_parent {
        registry.property_sets.ensure_acyclic(set, new_parent)?;
    }

    let mut result = CmdResult::default();
    if current == new_parent {
        result.add_message(CmdMessage::info(format!("{set} parent unchanged")));
        return Ok(result);
    }

    if let Some(old) = current {
        let inherited = registry.property_sets.get(old)?.attributes.clone();
        let stale: Vec<AttributeId> = registry
            .property_sets
            .get(set)?
            .attributes
            .iter()
            .copied()
            .filter(|a| {
                registry
                    .attributes
                    .get(*a)
                    .ok()
                    .and_then(|record| record.parent())
                    .is_some_and(|source| inherited.contains(&source))
            })
            .collect();

        for attribute in stale {
            for removed in delete_attribute_tree(registry, attribute)? {
                result.touch(removed);
            }
        }

        registry.property_sets.detach(set)?;
        registry.mark_property_set(old);
        registry.mark_property_set(set);
        result.touch(old);
        result.touch(set);
    }

    if let Some(new_parent) = new_parent {
        result.merge(attach_parent(registry, set, new_parent)?);
    }

    tracing::debug!(property_set = %set, ?current, ?new_parent, "changed property set parent");
    Ok(result)
}

fn attach_parent(
    registry: &mut Registry,
    set: PropertySetId,
    parent: PropertySetId,
) -> Result<CmdResult> {
    registry.property_sets.add_child(parent, set)?;

    let mut result = CmdResult::default();
    let owner = registry.property_sets.get(set)?.object;
    if owner.is_some() && owner == registry.property_sets.get(parent)?.object {
        tracing::debug!(property_set = %set, %parent, "parent property set has the same owner");
        result.add_message(CmdMessage::info(format!(
            "{set} inherits from {parent}, which belongs to the same object"
        )));
    }
    let sources = registry.property_sets.get(parent)?.attributes.clone();
    for source in sources {
        let clone = clone_attribute_into(registry, source, set)?;
        result.touch(clone);
        for deeper in propagate_to_children(registry, clone, set)? {
            result.touch(deeper);
        }
    }

    registry.mark_property_set(set);
    registry.mark_property_set(parent);
    result.touch(set);
    Ok(result)
}

/// Creates an attribute in `set` and clones it into every set below.
///
/// The value list goes through the same delimiter expansion as
/// [`crate::commands::attribute::set_value`].
pub fn add_attribute(
    registry: &mut Registry,
    config: &EngineConfig,
    set: PropertySetId,
    new: NewAttribute,
) -> Result<AttributeId> {
    registry.property_sets.get(set)?;

    let record = Attribute::new(
        set,
        new.name,
        expand_values(&new.value, config.value_delimiter),
        new.value_type.unwrap_or(config.default_value_type),
        new.data_type.unwrap_or(config.default_data_type),
    );
    let id = registry.attributes.insert(record);

    let owner = registry.property_sets.get_mut(set)?;
    owner.attributes.push(id);
    owner.changed = true;

    propagate_to_children(registry, id, set)?;
    Ok(id)
}

/// Removes `attribute` from `set` together with its clones in the sets below.
pub fn remove_attribute(
    registry: &mut Registry,
    set: PropertySetId,
    attribute: AttributeId,
) -> Result<CmdResult> {
    let owner = registry.property_sets.get(set)?;
    registry.attributes.get(attribute)?;
    if !owner.attributes.contains(&attribute) {
        return Err(SchemaError::NotAMember {
            item: attribute.into(),
            container: set.into(),
        });
    }

    let removed = delete_attribute_tree(registry, attribute)?;
    Ok(CmdResult::default().with_affected(removed.into_iter().map(Into::into).collect()))
}

pub fn rename(registry: &mut Registry, set: PropertySetId, name: String) -> Result<CmdResult> {
    let record = registry.property_sets.get_mut(set)?;
    record.name = name;
    record.changed = true;

    let mut result = CmdResult::default();
    result.touch(set);
    Ok(result)
}

/// Deletes `set`.
///
/// The set leaves its parent, its child sets are orphaned rather than deleted,
/// and it is removed from its owning object. Its attributes are removed; their
/// clones in the orphaned sets stay behind as root attributes.
pub fn delete(registry: &mut Registry, set: PropertySetId) -> Result<CmdResult> {
    let record = registry.property_sets.get(set)?;
    let owner = record.object;
    let attributes = record.attributes.clone();

    let mut result = CmdResult::default();

    if let Some(parent) = registry.property_sets.detach(set)? {
        registry.mark_property_set(parent);
        result.touch(parent);
    }

    for child in registry.property_sets.orphan_children(set)? {
        registry.mark_property_set(child);
        result.touch(child);
    }

    for attribute in attributes {
        for orphan in release_attribute(registry, attribute)? {
            result.touch(orphan);
        }
        result.touch(attribute);
    }

    if let Some(owner) = owner {
        if let Ok(object) = registry.objects.get_mut(owner) {
            object.property_sets.retain(|p| *p != set);
            object.changed = true;
            result.touch(owner);
        }
    }

    registry.property_sets.remove(set);
    registry.note_removal();
    result.touch(set);

    tracing::debug!(property_set = %set, "deleted property set");
    Ok(result)
}

/// Attributes of each structural ancestor of `set`, nearest ancestor first.
/// Ancestors without attributes are omitted.
pub fn inherited_attributes(
    registry: &Registry,
    set: PropertySetId,
) -> Result<IndexMap<PropertySetId, Vec<AttributeId>>> {
    let mut out = IndexMap::new();
    for ancestor in registry.property_sets.ancestors(set)? {
        let record = registry.property_sets.get(ancestor)?;
        if !record.attributes.is_empty() {
            out.insert(ancestor, record.attributes.clone());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{attribute, object};

    struct Fixture {
        registry: Registry,
        config: EngineConfig,
        wall: ObjectId,
        exterior: ObjectId,
    }

    fn setup() -> Fixture {
        let mut registry = Registry::new();
        let wall = object::create(&mut registry, "Wall".into(), "A".into(), None).unwrap();
        let exterior =
            object::create(&mut registry, "Wall-Exterior".into(), "B".into(), Some(wall))
                .unwrap();
        Fixture {
            registry,
            config: EngineConfig::default(),
            wall,
            exterior,
        }
    }

    fn add(f: &mut Fixture, set: PropertySetId, name: &str, value: &[&str]) -> AttributeId {
        let value = value.iter().map(|v| v.to_string()).collect();
        add_attribute(&mut f.registry, &f.config, set, NewAttribute::new(name, value)).unwrap()
    }

    fn names(registry: &Registry, set: PropertySetId) -> Vec<String> {
        registry
            .property_set(set)
            .unwrap()
            .attributes()
            .iter()
            .map(|a| registry.attribute(*a).unwrap().name().to_string())
            .collect()
    }

    fn clone_of_in(registry: &Registry, source: AttributeId, set: PropertySetId) -> Vec<AttributeId> {
        registry
            .property_set(set)
            .unwrap()
            .attributes()
            .iter()
            .copied()
            .filter(|a| registry.attribute(*a).unwrap().parent() == Some(source))
            .collect()
    }

    #[test]
    fn create_registers_with_owner() {
        let mut f = setup();
        let set = create(&mut f.registry, f.wall, "Pset_Wall".into(), None).unwrap();

        assert_eq!(f.registry.object(f.wall).unwrap().property_sets(), [set]);
        assert_eq!(f.registry.property_set(set).unwrap().object(), Some(f.wall));
    }

    #[test]
    fn create_with_missing_object_fails() {
        let mut f = setup();
        object::delete(&mut f.registry, f.exterior, crate::config::ObjectDeletePolicy::Orphan)
            .unwrap();
        let err = create(&mut f.registry, f.exterior, "X".into(), None).unwrap_err();
        assert!(matches!(err, SchemaError::EntityNotFound(_)));
    }

    #[test]
    fn parenting_mirrors_every_parent_attribute() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Pset_Wall".into(), None).unwrap();
        let material = add_attribute(
            &mut f.registry,
            &f.config,
            q,
            NewAttribute::new("Material", vec!["Concrete".into()])
                .with_value_type(ValueType::List)
                .with_data_type(DataType::XsString),
        )
        .unwrap();
        let width = add(&mut f, q, "Width", &["0.3"]);

        let p = create(&mut f.registry, f.exterior, "Pset_Wall".into(), Some(q)).unwrap();

        assert_eq!(names(&f.registry, p), vec!["Material", "Width"]);
        for source in [material, width] {
            let clones = clone_of_in(&f.registry, source, p);
            assert_eq!(clones.len(), 1);
            let src = f.registry.attribute(source).unwrap();
            let clone = f.registry.attribute(clones[0]).unwrap();
            assert_eq!(clone.name(), src.name());
            assert_eq!(clone.value(), src.value());
            assert_eq!(clone.value_type(), src.value_type());
            assert_eq!(clone.data_type(), src.data_type());
            assert_eq!(clone.property_set(), p);
        }
        assert_eq!(f.registry.property_set(p).unwrap().parent(), Some(q));
        assert_eq!(f.registry.property_set(q).unwrap().children(), [p]);
    }

    #[test]
    fn late_additions_reach_every_level() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();
        let leaf_owner =
            object::create(&mut f.registry, "Leaf".into(), "C".into(), Some(f.exterior)).unwrap();
        let r = create(&mut f.registry, leaf_owner, "R".into(), Some(p)).unwrap();

        let fire = add(&mut f, q, "FireRating", &["F90"]);

        let in_p = clone_of_in(&f.registry, fire, p);
        assert_eq!(in_p.len(), 1);
        let in_r = clone_of_in(&f.registry, in_p[0], r);
        assert_eq!(in_r.len(), 1);
        assert_eq!(f.registry.attribute(in_r[0]).unwrap().value(), ["F90"]);
    }

    #[test]
    fn parenting_a_set_with_children_extends_them_too() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.exterior, "P".into(), None).unwrap();
        let r = create(&mut f.registry, f.exterior, "R".into(), Some(p)).unwrap();

        set_parent(&mut f.registry, p, q).unwrap();

        assert_eq!(names(&f.registry, p), vec!["Material"]);
        assert_eq!(names(&f.registry, r), vec!["Material"]);
    }

    #[test]
    fn removing_an_attribute_removes_its_clones() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();
        let r = create(&mut f.registry, f.exterior, "R".into(), Some(p)).unwrap();
        let material = add(&mut f, q, "Material", &["Concrete"]);
        add(&mut f, q, "Width", &["0.3"]);

        let result = remove_attribute(&mut f.registry, q, material).unwrap();

        assert_eq!(result.affected.len(), 3);
        assert_eq!(names(&f.registry, q), vec!["Width"]);
        assert_eq!(names(&f.registry, p), vec!["Width"]);
        assert_eq!(names(&f.registry, r), vec!["Width"]);
        assert!(f.registry.attribute(material).is_err());
    }

    #[test]
    fn remove_attribute_requires_membership() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        let other = create(&mut f.registry, f.wall, "Other".into(), None).unwrap();
        let material = add(&mut f, q, "Material", &["Concrete"]);

        let err = remove_attribute(&mut f.registry, other, material).unwrap_err();
        assert!(matches!(err, SchemaError::NotAMember { .. }));
        assert_eq!(names(&f.registry, q), vec!["Material"]);
    }

    #[test]
    fn change_parent_swaps_inherited_attributes_and_keeps_local_ones() {
        let mut f = setup();
        let q1 = create(&mut f.registry, f.wall, "Q1".into(), None).unwrap();
        add(&mut f, q1, "Material", &["Concrete"]);
        let q2 = create(&mut f.registry, f.wall, "Q2".into(), None).unwrap();
        add(&mut f, q2, "Colour", &["Grey"]);

        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q1)).unwrap();
        add(&mut f, p, "Local", &["x"]);
        let r = create(&mut f.registry, f.exterior, "R".into(), Some(p)).unwrap();
        assert_eq!(names(&f.registry, r), vec!["Material", "Local"]);

        change_parent(&mut f.registry, p, Some(q2)).unwrap();

        assert_eq!(names(&f.registry, p), vec!["Local", "Colour"]);
        assert_eq!(names(&f.registry, r), vec!["Local", "Colour"]);
        assert!(f.registry.property_set(q1).unwrap().children().is_empty());
        assert_eq!(f.registry.property_set(p).unwrap().parent(), Some(q2));
    }

    #[test]
    fn set_parent_on_parented_set_behaves_as_change_parent() {
        let mut f = setup();
        let q1 = create(&mut f.registry, f.wall, "Q1".into(), None).unwrap();
        add(&mut f, q1, "Material", &["Concrete"]);
        let q2 = create(&mut f.registry, f.wall, "Q2".into(), None).unwrap();
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q1)).unwrap();

        set_parent(&mut f.registry, p, q2).unwrap();
        assert!(names(&f.registry, p).is_empty());
    }

    #[test]
    fn change_parent_to_none_detaches() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();

        change_parent(&mut f.registry, p, None).unwrap();

        assert!(names(&f.registry, p).is_empty());
        assert_eq!(f.registry.property_set(p).unwrap().parent(), None);
        // Later additions to the former parent no longer propagate.
        add(&mut f, q, "Width", &["0.3"]);
        assert!(names(&f.registry, p).is_empty());
    }

    #[test]
    fn same_parent_is_a_no_op() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();

        let result = set_parent(&mut f.registry, p, q).unwrap();
        assert!(result.affected.is_empty());
        assert_eq!(result.messages.len(), 1);
        assert_eq!(names(&f.registry, p), vec!["Material"]);
    }

    #[test]
    fn cyclic_parent_is_rejected_without_changes() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();

        let err = set_parent(&mut f.registry, q, p).unwrap_err();
        assert!(matches!(err, SchemaError::CyclicParent { .. }));
        let err = set_parent(&mut f.registry, q, q).unwrap_err();
        assert!(matches!(err, SchemaError::CyclicParent { .. }));

        assert_eq!(names(&f.registry, q), vec!["Material"]);
        assert_eq!(f.registry.property_set(q).unwrap().parent(), None);
    }

    #[test]
    fn clone_values_are_independent_of_the_source() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        let material = add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();
        let clone = clone_of_in(&f.registry, material, p)[0];

        attribute::set_value(&mut f.registry, &f.config, clone, &["Brick"]).unwrap();

        assert_eq!(f.registry.attribute(material).unwrap().value(), ["Concrete"]);
        assert_eq!(f.registry.attribute(clone).unwrap().value(), ["Brick"]);
    }

    #[test]
    fn add_attribute_expands_values_and_applies_defaults() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        let id = add(&mut f, q, "Material", &["Concrete|Brick", "Steel"]);

        let record = f.registry.attribute(id).unwrap();
        assert_eq!(record.value(), ["Concrete", "Brick", "Steel"]);
        assert_eq!(record.value_type(), ValueType::Value);
        assert_eq!(record.data_type(), DataType::XsString);
    }

    #[test]
    fn delete_orphans_children_and_keeps_their_attributes() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        let material = add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();
        let clone = clone_of_in(&f.registry, material, p)[0];

        delete(&mut f.registry, q).unwrap();

        assert!(f.registry.property_set(q).is_err());
        assert!(f.registry.attribute(material).is_err());
        assert!(f.registry.object(f.wall).unwrap().property_sets().is_empty());

        let p_record = f.registry.property_set(p).unwrap();
        assert_eq!(p_record.parent(), None);
        let orphan = f.registry.attribute(clone).unwrap();
        assert_eq!(orphan.parent(), None);
        assert_eq!(orphan.value(), ["Concrete"]);
    }

    #[test]
    fn delete_detaches_from_parent() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        let material = add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();

        delete(&mut f.registry, p).unwrap();

        assert!(f.registry.property_set(q).unwrap().children().is_empty());
        assert!(f.registry.attribute(material).unwrap().children().is_empty());
        assert!(f.registry.object(f.exterior).unwrap().property_sets().is_empty());
    }

    #[test]
    fn inherited_attributes_walk_nearest_first() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        let material = add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.exterior, "P".into(), Some(q)).unwrap();
        let r = create(&mut f.registry, f.exterior, "R".into(), Some(p)).unwrap();
        let empty = create(&mut f.registry, f.exterior, "Empty".into(), None).unwrap();

        let map = inherited_attributes(&f.registry, r).unwrap();
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![p, q]);
        assert_eq!(map[&q], vec![material]);

        assert!(inherited_attributes(&f.registry, empty).unwrap().is_empty());
    }

    #[test]
    fn rename_marks_dirty() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        f.registry.reset_changed();

        rename(&mut f.registry, q, "Pset_Renamed".into()).unwrap();
        let record = f.registry.property_set(q).unwrap();
        assert_eq!(record.name(), "Pset_Renamed");
        assert!(record.is_changed());
    }

    #[test]
    fn parenting_within_one_object_is_reported() {
        let mut f = setup();
        let q = create(&mut f.registry, f.wall, "Q".into(), None).unwrap();
        add(&mut f, q, "Material", &["Concrete"]);
        let p = create(&mut f.registry, f.wall, "P".into(), None).unwrap();
        let other = create(&mut f.registry, f.exterior, "O".into(), None).unwrap();

        let result = set_parent(&mut f.registry, p, q).unwrap();
        assert_eq!(result.messages.len(), 1);
        assert!(!result.has_warnings());
        assert_eq!(names(&f.registry, p), vec!["Material"]);

        let result = set_parent(&mut f.registry, other, q).unwrap();
        assert!(result.messages.is_empty());
    }
}
