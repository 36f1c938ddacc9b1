//! # Command Layer
//!
//! This module contains the **engine logic**. Each entity kind has its own
//! submodule of plain functions that take the [`crate::store::Registry`]
//! explicitly, validate, apply the local change, run any cascade to
//! completion and mark the touched entities dirty.
//!
//! ## Contract
//!
//! - **Validate first**: every check that can fail runs before the first
//!   write, so a rejected command leaves the graph untouched.
//! - **No partial cascades**: clone creation, clone removal and name/type
//!   propagation finish before the command returns.
//! - **No I/O**: commands return data. Presentation belongs to collaborators.
//!
//! ## Structured Returns
//!
//! Factories return the new entity's id. Other mutations return
//! [`CmdResult`], carrying:
//! - `affected`: every entity the command wrote to, cascade included
//! - `messages`: non-fatal conditions (for example a suppressed write to a
//!   locked value) for the caller to present
//!
//! ## Command Modules
//!
//! - [`object`]: Create, reparent, rename, delete objects; property-set ownership
//! - [`property_set`]: Create, parent, rename, delete property sets; add/remove attributes
//! - [`attribute`]: Value, name and type setters; lock flag; delete
//! - [`script`]: Scripts attached to objects
//! - [`helpers`]: Shared cascades

use crate::model::EntityRef;
use serde::Serialize;

pub mod attribute;
pub mod helpers;
pub mod object;
pub mod property_set;
pub mod script;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct CmdResult {
    pub affected: Vec<EntityRef>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn touch(&mut self, entity: impl Into<EntityRef>) {
        let entity = entity.into();
        if !self.affected.contains(&entity) {
            self.affected.push(entity);
        }
    }

    pub fn with_affected(mut self, affected: Vec<EntityRef>) -> Self {
        self.affected = affected;
        self
    }

    /// Folds another result into this one, keeping order.
    pub fn merge(&mut self, other: CmdResult) {
        for entity in other.affected {
            self.touch(entity);
        }
        self.messages.extend(other.messages);
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Warning)
    }
}
