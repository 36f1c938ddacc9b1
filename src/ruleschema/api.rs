//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for collaborators such as a UI tree, a rule exporter or a
//! spreadsheet importer.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns** the open [`Project`] and the [`EngineConfig`]
//! - **Dispatches** to the appropriate command function with the project's
//!   registry
//! - **Fills in defaults** from the config (delete policy, value delimiter,
//!   default types)
//! - **Returns structured types** (`Result<CmdResult>` or new ids)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **Persistence**: Serializers read and write the graph through this API
//! - **Presentation**: Views are data; see [`crate::view`]
//!
//! ## Testing Strategy
//!
//! API tests verify dispatch and the config defaults the facade supplies.
//! Command behavior is tested in the command modules.

use crate::commands::property_set::NewAttribute;
use crate::commands::{attribute, object, property_set, script, CmdResult};
use crate::config::{EngineConfig, ObjectDeletePolicy};
use crate::error::Result;
use crate::model::{AttributeId, DataType, ObjectId, PropertySetId, ScriptId, ValueType};
use crate::project::Project;
use crate::view::{self, AttributeView, ObjectView, PropertySetView};
use indexmap::IndexMap;

/// The main API facade for schema editing.
///
/// One instance corresponds to one open document.
#[derive(Debug, Clone, Default)]
pub struct SchemaApi {
    project: Project,
    config: EngineConfig,
}

impl SchemaApi {
    pub fn new(project: Project, config: EngineConfig) -> Self {
        Self { project, config }
    }

    /// Starts an empty document configured from the per-user config file,
    /// or from defaults when there is none.
    pub fn open(name: String) -> Result<Self> {
        let config = EngineConfig::load_global()?;
        tracing::debug!(?config, "loaded global config");
        Ok(Self::new(Project::new(name), config))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Document ---

    pub fn changed(&self) -> bool {
        self.project.changed()
    }

    /// Called by the save collaborator after a successful persist.
    pub fn reset_changed(&mut self) {
        self.project.reset_changed();
    }

    /// Discards the current document and starts an empty one.
    pub fn new_document(&mut self, name: String) {
        self.project.new_document(name);
    }

    // --- Objects ---

    pub fn create_object(
        &mut self,
        name: String,
        identifier: String,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        object::create(self.project.registry_mut(), name, identifier, parent)
    }

    pub fn reparent_object(
        &mut self,
        object: ObjectId,
        new_parent: Option<ObjectId>,
    ) -> Result<CmdResult> {
        object::reparent(self.project.registry_mut(), object, new_parent)
    }

    pub fn rename_object(&mut self, object: ObjectId, name: String) -> Result<CmdResult> {
        object::rename(self.project.registry_mut(), object, name)
    }

    pub fn set_object_identifier(
        &mut self,
        object: ObjectId,
        identifier: String,
    ) -> Result<CmdResult> {
        object::set_identifier(self.project.registry_mut(), object, identifier)
    }

    pub fn set_object_concept(&mut self, object: ObjectId, is_concept: bool) -> Result<CmdResult> {
        object::set_concept(self.project.registry_mut(), object, is_concept)
    }

    pub fn object_by_identifier(&self, identifier: &str) -> Option<ObjectId> {
        self.project.registry().object_by_identifier(identifier)
    }

    /// Deletes `object`. Without an explicit `policy` the configured
    /// `object_delete_policy` applies.
    pub fn delete_object(
        &mut self,
        object: ObjectId,
        policy: Option<ObjectDeletePolicy>,
    ) -> Result<CmdResult> {
        let policy = policy.unwrap_or(self.config.object_delete_policy);
        object::delete(self.project.registry_mut(), object, policy)
    }

    pub fn inherited_property_sets(
        &self,
        object: ObjectId,
    ) -> Result<IndexMap<ObjectId, Vec<PropertySetId>>> {
        object::inherited_property_sets(self.project.registry(), object)
    }

    pub fn add_property_set(&mut self, object: ObjectId, set: PropertySetId) -> Result<CmdResult> {
        object::add_property_set(self.project.registry_mut(), object, set)
    }

    pub fn remove_property_set(
        &mut self,
        object: ObjectId,
        set: PropertySetId,
    ) -> Result<CmdResult> {
        object::remove_property_set(self.project.registry_mut(), object, set)
    }

    // --- Property sets ---

    pub fn create_property_set(
        &mut self,
        object: ObjectId,
        name: String,
        parent: Option<PropertySetId>,
    ) -> Result<PropertySetId> {
        property_set::create(self.project.registry_mut(), object, name, parent)
    }

    pub fn set_property_set_parent(
        &mut self,
        set: PropertySetId,
        parent: PropertySetId,
    ) -> Result<CmdResult> {
        property_set::set_parent(self.project.registry_mut(), set, parent)
    }

    pub fn change_property_set_parent(
        &mut self,
        set: PropertySetId,
        new_parent: Option<PropertySetId>,
    ) -> Result<CmdResult> {
        property_set::change_parent(self.project.registry_mut(), set, new_parent)
    }

    pub fn rename_property_set(&mut self, set: PropertySetId, name: String) -> Result<CmdResult> {
        property_set::rename(self.project.registry_mut(), set, name)
    }

    pub fn delete_property_set(&mut self, set: PropertySetId) -> Result<CmdResult> {
        property_set::delete(self.project.registry_mut(), set)
    }

    pub fn inherited_attributes(
        &self,
        set: PropertySetId,
    ) -> Result<IndexMap<PropertySetId, Vec<AttributeId>>> {
        property_set::inherited_attributes(self.project.registry(), set)
    }

    // --- Attributes ---

    /// Adds an attribute. `None` types fall back to the configured defaults.
    pub fn add_attribute(
        &mut self,
        set: PropertySetId,
        name: String,
        values: Vec<String>,
        value_type: Option<ValueType>,
        data_type: Option<DataType>,
    ) -> Result<AttributeId> {
        let new = NewAttribute {
            name,
            value: values,
            value_type,
            data_type,
        };
        property_set::add_attribute(self.project.registry_mut(), &self.config, set, new)
    }

    pub fn remove_attribute(
        &mut self,
        set: PropertySetId,
        attribute: AttributeId,
    ) -> Result<CmdResult> {
        property_set::remove_attribute(self.project.registry_mut(), set, attribute)
    }

    pub fn set_attribute_value<I, S>(&mut self, attribute: AttributeId, values: I) -> Result<CmdResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        attribute::set_value(self.project.registry_mut(), &self.config, attribute, values)
    }

    pub fn set_attribute_name(&mut self, attribute: AttributeId, name: String) -> Result<CmdResult> {
        attribute::set_name(self.project.registry_mut(), attribute, name)
    }

    pub fn set_attribute_value_type(
        &mut self,
        attribute: AttributeId,
        value_type: ValueType,
    ) -> Result<CmdResult> {
        attribute::set_value_type(self.project.registry_mut(), attribute, value_type)
    }

    pub fn set_attribute_data_type(
        &mut self,
        attribute: AttributeId,
        data_type: DataType,
    ) -> Result<CmdResult> {
        attribute::set_data_type(self.project.registry_mut(), attribute, data_type)
    }

    pub fn set_child_inherits_values(
        &mut self,
        attribute: AttributeId,
        locked: bool,
    ) -> Result<CmdResult> {
        attribute::set_child_inherits_values(self.project.registry_mut(), attribute, locked)
    }

    pub fn delete_attribute(&mut self, attribute: AttributeId) -> Result<CmdResult> {
        attribute::delete(self.project.registry_mut(), attribute)
    }

    pub fn attributes_equal(&self, a: AttributeId, b: AttributeId) -> Result<bool> {
        attribute::is_equal(self.project.registry(), a, b)
    }

    // --- Scripts ---

    pub fn create_script(&mut self, object: ObjectId, name: String, code: String) -> Result<ScriptId> {
        script::create(self.project.registry_mut(), object, name, code)
    }

    pub fn rename_script(&mut self, script: ScriptId, name: String) -> Result<CmdResult> {
        script::rename(self.project.registry_mut(), script, name)
    }

    pub fn set_script_code(&mut self, script: ScriptId, code: String) -> Result<CmdResult> {
        script::set_code(self.project.registry_mut(), script, code)
    }

    pub fn delete_script(&mut self, script: ScriptId) -> Result<CmdResult> {
        script::delete(self.project.registry_mut(), script)
    }

    // --- Views ---

    pub fn object_view(&self, object: ObjectId) -> Result<ObjectView> {
        view::object_view(self.project.registry(), object)
    }

    pub fn property_set_view(&self, set: PropertySetId) -> Result<PropertySetView> {
        view::property_set_view(self.project.registry(), set)
    }

    pub fn attribute_view(&self, attribute: AttributeId) -> Result<AttributeView> {
        view::attribute_view(self.project.registry(), attribute)
    }

    pub fn root_objects(&self) -> Vec<ObjectId> {
        view::root_objects(self.project.registry())
    }

    pub fn attributes_by_property_set(
        &self,
        object: ObjectId,
    ) -> Result<IndexMap<PropertySetId, Vec<AttributeView>>> {
        view::attributes_by_property_set(self.project.registry(), object)
    }

    pub fn property_set_by_name(&self, object: ObjectId, name: &str) -> Result<Option<PropertySetId>> {
        view::property_set_by_name(self.project.registry(), object, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::fixtures::WallScenario;

    fn api_from(scenario: WallScenario) -> SchemaApi {
        SchemaApi::new(scenario.project, scenario.config)
    }

    #[test]
    fn delete_object_uses_configured_policy() {
        let s = WallScenario::build().unwrap();
        let (wall, pset) = (s.wall, s.pset_wall);
        let config = EngineConfig {
            object_delete_policy: ObjectDeletePolicy::Cascade,
            ..Default::default()
        };
        let mut api = SchemaApi::new(s.project, config);

        api.delete_object(wall, None).unwrap();
        assert!(api.property_set_view(pset).is_err());
    }

    #[test]
    fn explicit_policy_overrides_config() {
        let s = WallScenario::build().unwrap();
        let (wall, pset) = (s.wall, s.pset_wall);
        let mut api = api_from(s);

        api.delete_object(wall, Some(ObjectDeletePolicy::Orphan)).unwrap();
        assert_eq!(api.property_set_view(pset).unwrap().object, None);
    }

    #[test]
    fn add_attribute_applies_config_defaults() {
        let s = WallScenario::build().unwrap();
        let set = s.pset_wall;
        let config = EngineConfig {
            default_data_type: DataType::XsDouble,
            value_delimiter: ';',
            ..Default::default()
        };
        let mut api = SchemaApi::new(s.project, config);

        let id = api
            .add_attribute(set, "Width".into(), vec!["1;2".into()], None, None)
            .unwrap();
        let view = api.attribute_view(id).unwrap();
        assert_eq!(view.data_type, DataType::XsDouble);
        assert_eq!(view.value_type, ValueType::Value);
        assert_eq!(view.value, vec!["1", "2"]);
    }

    #[test]
    fn strict_lock_surfaces_error() {
        let s = WallScenario::build().unwrap();
        let (material, clone) = (s.material, s.material_clone().unwrap());
        let config = EngineConfig {
            strict_value_lock: true,
            ..Default::default()
        };
        let mut api = SchemaApi::new(s.project, config);

        api.set_child_inherits_values(material, true).unwrap();
        let err = api.set_attribute_value(clone, ["Brick"]).unwrap_err();
        assert!(matches!(err, SchemaError::LockedValue(id) if id == clone));
    }

    #[test]
    fn open_starts_clean_with_global_config() {
        let api = SchemaApi::open("Fresh".into()).unwrap();

        assert_eq!(api.config(), &EngineConfig::load_global().unwrap());
        assert_eq!(api.project().name(), "Fresh");
        assert!(api.root_objects().is_empty());
        assert!(!api.changed());
    }

    #[test]
    fn new_document_clears_registry() {
        let mut api = api_from(WallScenario::build().unwrap());
        api.new_document("Empty".into());

        assert!(api.root_objects().is_empty());
        assert!(api.object_by_identifier("A").is_none());
        assert!(!api.changed());
        assert_eq!(api.project().name(), "Empty");
    }

    #[test]
    fn mutations_mark_changed() {
        let s = WallScenario::build().unwrap();
        let wall = s.wall;
        let mut api = api_from(s);
        assert!(!api.changed());

        api.rename_object(wall, "Walls".into()).unwrap();
        assert!(api.changed());
        api.reset_changed();
        assert!(!api.changed());
    }
}
