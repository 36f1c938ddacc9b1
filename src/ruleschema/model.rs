//! # Domain Model: Objects, Property Sets and Attributes
//!
//! This module defines the records stored in the [`crate::store::Registry`]:
//! [`Object`], [`PropertySet`], [`Attribute`] and [`Script`], together with the
//! opaque ids used to address them.
//!
//! ## Two Hierarchies, Layered
//!
//! ```text
//! Object "Wall"                    PropertySet "Pset_Wall"      Attribute "Material"
//!   └── Object "Wall-Exterior"       └── PropertySet (clone)      └── Attribute (clone)
//! ```
//!
//! - **Objects** form a category tree. A child Object sees its ancestors'
//!   property sets through `inherited_property_sets`, nothing is copied.
//! - **PropertySets** and **Attributes** form a second, *structural* hierarchy.
//!   Parenting a property set onto another materializes clone attributes, and
//!   each clone records its source as its structural parent.
//!
//! Records never hold references to each other, only ids. All link maintenance
//! goes through the command layer so both ends of a link always agree.
//!
//! ## Value Lists
//!
//! An attribute value is an ordered list of strings. Incoming lists are run
//! through [`expand_values`], which splits every token on the delimiter:
//!
//! ```text
//! ["a|b", "c"]  ->  ["a", "b", "c"]
//! ["a"]         ->  ["a"]
//! ```

use crate::hierarchy::{HierarchyNode, Links};
use crate::store::arena::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_DELIMITER: char = '|';

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl EntityId for $name {
            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} #{}", $label, self.0)
            }
        }

        impl From<$name> for EntityRef {
            fn from(id: $name) -> Self {
                EntityRef::$variant(id)
            }
        }
    };
}

entity_id!(
    /// Registry handle of an [`Object`].
    ObjectId,
    Object,
    "object"
);
entity_id!(
    /// Registry handle of a [`PropertySet`].
    PropertySetId,
    PropertySet,
    "property set"
);
entity_id!(
    /// Registry handle of an [`Attribute`].
    AttributeId,
    Attribute,
    "attribute"
);
entity_id!(ScriptId, Script, "script");

/// A typed reference to any registry entity, used in results and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Object(ObjectId),
    PropertySet(PropertySetId),
    Attribute(AttributeId),
    Script(ScriptId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Object(id) => id.fmt(f),
            EntityRef::PropertySet(id) => id.fmt(f),
            EntityRef::Attribute(id) => id.fmt(f),
            EntityRef::Script(id) => id.fmt(f),
        }
    }
}

/// How the value list of an attribute is interpreted by rule exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    Value,
    Format,
    Range,
    List,
}

/// XML schema data type of an attribute's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    #[default]
    #[serde(rename = "xs:string")]
    XsString,
    #[serde(rename = "xs:boolean")]
    XsBoolean,
    #[serde(rename = "xs:double")]
    XsDouble,
    #[serde(rename = "xs:integer")]
    XsInteger,
    #[serde(rename = "xs:date")]
    XsDate,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::XsString => "xs:string",
            DataType::XsBoolean => "xs:boolean",
            DataType::XsDouble => "xs:double",
            DataType::XsInteger => "xs:integer",
            DataType::XsDate => "xs:date",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category node of the authoring tree.
#[derive(Debug, Clone)]
pub struct Object {
    pub(crate) name: String,
    pub(crate) identifier: String,
    pub(crate) is_concept: bool,
    pub(crate) property_sets: Vec<PropertySetId>,
    pub(crate) scripts: Vec<ScriptId>,
    pub(crate) links: Links<ObjectId>,
    pub(crate) changed: bool,
}

impl Object {
    pub(crate) fn new(name: String, identifier: String, is_concept: bool) -> Self {
        Self {
            name,
            identifier,
            is_concept,
            property_sets: Vec::new(),
            scripts: Vec::new(),
            links: Links::new(),
            changed: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_concept(&self) -> bool {
        self.is_concept
    }

    pub fn property_sets(&self) -> &[PropertySetId] {
        &self.property_sets
    }

    pub fn scripts(&self) -> &[ScriptId] {
        &self.scripts
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

impl HierarchyNode for Object {
    type Id = ObjectId;

    fn links(&self) -> &Links<ObjectId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<ObjectId> {
        &mut self.links
    }
}

/// A named, ordered group of attributes owned by one object.
///
/// `object` is `None` only for property sets that were detached from their
/// owner (see `ObjectDeletePolicy::Orphan` and `remove_property_set`).
#[derive(Debug, Clone)]
pub struct PropertySet {
    pub(crate) name: String,
    pub(crate) object: Option<ObjectId>,
    pub(crate) attributes: Vec<AttributeId>,
    pub(crate) links: Links<PropertySetId>,
    pub(crate) changed: bool,
}

impl PropertySet {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            object: None,
            attributes: Vec::new(),
            links: Links::new(),
            changed: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }

    pub fn attributes(&self) -> &[AttributeId] {
        &self.attributes
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

impl HierarchyNode for PropertySet {
    type Id = PropertySetId;

    fn links(&self) -> &Links<PropertySetId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<PropertySetId> {
        &mut self.links
    }
}

/// A typed name/value record. Its structural parent, if any, is the attribute
/// it was cloned from.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub(crate) name: String,
    pub(crate) value: Vec<String>,
    pub(crate) value_type: ValueType,
    pub(crate) data_type: DataType,
    pub(crate) property_set: PropertySetId,
    pub(crate) child_inherits_values: bool,
    pub(crate) links: Links<AttributeId>,
    pub(crate) changed: bool,
}

impl Attribute {
    pub(crate) fn new(
        property_set: PropertySetId,
        name: String,
        value: Vec<String>,
        value_type: ValueType,
        data_type: DataType,
    ) -> Self {
        Self {
            name,
            value,
            value_type,
            data_type,
            property_set,
            child_inherits_values: false,
            links: Links::new(),
            changed: true,
        }
    }

    /// A fresh record for `property_set` carrying this attribute's name, types
    /// and an independently owned copy of its value list. Links are left empty.
    pub(crate) fn clone_into(&self, property_set: PropertySetId) -> Self {
        Self::new(
            property_set,
            self.name.clone(),
            self.value.clone(),
            self.value_type,
            self.data_type,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &[String] {
        &self.value
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn property_set(&self) -> PropertySetId {
        self.property_set
    }

    pub fn child_inherits_values(&self) -> bool {
        self.child_inherits_values
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

impl HierarchyNode for Attribute {
    type Id = AttributeId;

    fn links(&self) -> &Links<AttributeId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<AttributeId> {
        &mut self.links
    }
}

/// A small code container attached to an object.
#[derive(Debug, Clone)]
pub struct Script {
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) object: Option<ObjectId>,
    pub(crate) changed: bool,
}

impl Script {
    pub(crate) fn new(name: String, code: String, object: ObjectId) -> Self {
        Self {
            name,
            code,
            object: Some(object),
            changed: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

/// Splits every token containing `delimiter` into its parts, in order.
///
/// Tokens without the delimiter pass through unchanged, so running the
/// expansion on an already expanded list is the identity.
pub fn expand_values<I, S>(input: I, delimiter: char) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for token in input {
        let token = token.as_ref();
        if token.contains(delimiter) {
            out.extend(token.split(delimiter).map(str::to_string));
        } else {
            out.push(token.to_string());
        }
    }
    out
}
