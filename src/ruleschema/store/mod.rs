//! # Registry
//!
//! The [`Registry`] is the document-scoped store. It replaces any notion of
//! process-wide class registries: one registry belongs to one
//! [`crate::project::Project`], and every command takes it explicitly.
//!
//! ## Contents
//!
//! - One [`arena::Arena`] per entity kind: objects, property sets, attributes,
//!   scripts. Presence in an arena is what "live" means.
//! - The identifier index, mapping each object identifier to its object.
//!   Identifiers are unique among live objects and are released on deletion.
//! - A removal flag, raised whenever a live entity leaves the registry, so
//!   the dirty scan still reports a change after the only dirty entity is gone.
//!
//! ## Dirty Scanning
//!
//! ```text
//! any_changed = removals_pending
//!            || any object.changed
//!            || any property_set.changed
//!            || any attribute.changed
//!            || any script.changed
//! ```
//!
//! Nothing is cached; the scan walks every live entity on demand.

use crate::error::{Result, SchemaError};
use crate::model::{
    Attribute, AttributeId, Object, ObjectId, PropertySet, PropertySetId, Script, ScriptId,
};
use indexmap::IndexMap;

pub mod arena;

use arena::Arena;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) objects: Arena<ObjectId, Object>,
    pub(crate) property_sets: Arena<PropertySetId, PropertySet>,
    pub(crate) attributes: Arena<AttributeId, Attribute>,
    pub(crate) scripts: Arena<ScriptId, Script>,
    identifiers: IndexMap<String, ObjectId>,
    removals_pending: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, id: ObjectId) -> Result<&Object> {
        self.objects.get(id)
    }

    pub fn property_set(&self, id: PropertySetId) -> Result<&PropertySet> {
        self.property_sets.get(id)
    }

    pub fn attribute(&self, id: AttributeId) -> Result<&Attribute> {
        self.attributes.get(id)
    }

    pub fn script(&self, id: ScriptId) -> Result<&Script> {
        self.scripts.get(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter()
    }

    pub fn property_sets(&self) -> impl Iterator<Item = (PropertySetId, &PropertySet)> {
        self.property_sets.iter()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (AttributeId, &Attribute)> {
        self.attributes.iter()
    }

    pub fn scripts(&self) -> impl Iterator<Item = (ScriptId, &Script)> {
        self.scripts.iter()
    }

    /// Looks up the live object registered under `identifier`.
    pub fn object_by_identifier(&self, identifier: &str) -> Option<ObjectId> {
        self.identifiers.get(identifier).copied()
    }

    pub fn is_identifier_registered(&self, identifier: &str) -> bool {
        self.identifiers.contains_key(identifier)
    }

    pub(crate) fn ensure_identifier_free(&self, identifier: &str) -> Result<()> {
        if self.is_identifier_registered(identifier) {
            return Err(SchemaError::DuplicateIdentifier(identifier.to_string()));
        }
        Ok(())
    }

    pub(crate) fn register_identifier(&mut self, identifier: String, id: ObjectId) -> Result<()> {
        self.ensure_identifier_free(&identifier)?;
        self.identifiers.insert(identifier, id);
        Ok(())
    }

    pub(crate) fn release_identifier(&mut self, identifier: &str) {
        self.identifiers.shift_remove(identifier);
    }

    pub(crate) fn note_removal(&mut self) {
        self.removals_pending = true;
    }

    /// True if any live entity is dirty or an entity was removed since the
    /// last reset.
    pub fn any_changed(&self) -> bool {
        self.removals_pending
            || self.objects.iter().any(|(_, o)| o.changed)
            || self.property_sets.iter().any(|(_, p)| p.changed)
            || self.attributes.iter().any(|(_, a)| a.changed)
            || self.scripts.iter().any(|(_, s)| s.changed)
    }

    pub fn reset_changed(&mut self) {
        self.removals_pending = false;
        self.objects.values_mut().for_each(|o| o.changed = false);
        self.property_sets.values_mut().for_each(|p| p.changed = false);
        self.attributes.values_mut().for_each(|a| a.changed = false);
        self.scripts.values_mut().for_each(|s| s.changed = false);
    }

    /// Drops every entity and identifier, as for a new document.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.property_sets.clear();
        self.attributes.clear();
        self.scripts.clear();
        self.identifiers.clear();
        self.removals_pending = false;
    }

    pub(crate) fn mark_object(&mut self, id: ObjectId) {
        if let Ok(o) = self.objects.get_mut(id) {
            o.changed = true;
        }
    }

    pub(crate) fn mark_property_set(&mut self, id: PropertySetId) {
        if let Ok(p) = self.property_sets.get_mut(id) {
            p.changed = true;
        }
    }
}
