//! Prebuilt documents for tests.
//!
//! Compiled for this crate's own tests and, behind the `test_utils` feature,
//! for downstream crates that want a populated [`Project`].

use crate::commands::property_set::NewAttribute;
use crate::commands::{object, property_set};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{AttributeId, ObjectId, PropertySetId};
use crate::project::Project;

/// Two objects, a property set on the parent and a dependent set on the child.
///
/// ```text
/// Wall (A)                 Pset_Wall: Material = ["Concrete"]
///   └── Wall-Exterior (B)    └── Pset_WallExterior: Material' = ["Concrete"]
/// ```
///
/// The project is reset after building, so it starts clean.
pub struct WallScenario {
    pub project: Project,
    pub config: EngineConfig,
    pub wall: ObjectId,
    pub exterior: ObjectId,
    pub pset_wall: PropertySetId,
    pub material: AttributeId,
    pub exterior_set: PropertySetId,
}

impl WallScenario {
    pub fn build() -> Result<Self> {
        let config = EngineConfig::default();
        let mut project = Project::new("Fixture".into());
        let registry = project.registry_mut();

        let wall = object::create(registry, "Wall".into(), "A".into(), None)?;
        let exterior =
            object::create(registry, "Wall-Exterior".into(), "B".into(), Some(wall))?;
        let pset_wall = property_set::create(registry, wall, "Pset_Wall".into(), None)?;
        let material = property_set::add_attribute(
            registry,
            &config,
            pset_wall,
            NewAttribute::new("Material", vec!["Concrete".into()]),
        )?;
        let exterior_set = property_set::create(
            registry,
            exterior,
            "Pset_WallExterior".into(),
            Some(pset_wall),
        )?;

        project.reset_changed();
        Ok(Self {
            project,
            config,
            wall,
            exterior,
            pset_wall,
            material,
            exterior_set,
        })
    }

    /// The clone of `Material` living in `Pset_WallExterior`.
    pub fn material_clone(&self) -> Option<AttributeId> {
        let set = self.project.registry().property_set(self.exterior_set).ok()?;
        set.attributes().first().copied()
    }
}
