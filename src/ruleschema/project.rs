//! Document-level metadata and the aggregated unsaved-change signal.
//!
//! A [`Project`] owns the document's [`Registry`]. Its `changed` flag covers
//! edits to the project's own metadata; [`Project::changed`] combines it with
//! a scan of every live entity in the registry.

use crate::store::Registry;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Project {
    id: Uuid,
    name: String,
    author: String,
    version: String,
    created_at: DateTime<Utc>,
    saved_at: Option<DateTime<Utc>>,
    changed: bool,
    registry: Registry,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Project {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            author: String::new(),
            version: "1.0.0".to_string(),
            created_at: Utc::now(),
            saved_at: None,
            changed: false,
            registry: Registry::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When [`Project::reset_changed`] last ran, i.e. the last successful save.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.changed = true;
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
        self.changed = true;
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
        self.changed = true;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// True if the project's own flag is set or anything in the registry is
    /// dirty.
    pub fn changed(&self) -> bool {
        self.changed || self.registry.any_changed()
    }

    /// Clears every dirty flag. Called by the save collaborator after a
    /// successful persist.
    pub fn reset_changed(&mut self) {
        self.changed = false;
        self.registry.reset_changed();
        self.saved_at = Some(Utc::now());
        tracing::info!(project = %self.id, "project marked as saved");
    }

    /// Empties the registry and resets the metadata for a fresh document.
    ///
    /// Entity ids restart from 1, so ids held from the previous document
    /// must be dropped by the caller.
    pub fn new_document(&mut self, name: String) {
        self.registry.clear();
        self.id = Uuid::new_v4();
        self.name = name;
        self.author.clear();
        self.version = "1.0.0".to_string();
        self.created_at = Utc::now();
        self.saved_at = None;
        self.changed = false;
        tracing::info!(project = %self.id, "started new document");
    }
}
