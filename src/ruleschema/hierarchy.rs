//! # Tree Links
//!
//! Every entity that lives in a hierarchy (objects, property sets, attributes)
//! carries a [`Links`] value: an optional parent id and an ordered list of
//! child ids. The record alone cannot keep both ends of a link in agreement,
//! so `Links` only exposes raw edits to the store. Paired updates
//! (`add_child` / `remove_child`) live on [`crate::store::arena::Arena`],
//! which owns both records.
//!
//! Links do not prevent cycles. Callers that accept a new parent must run
//! `Arena::ensure_acyclic` first.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links<Id> {
    parent: Option<Id>,
    children: Vec<Id>,
}

impl<Id> Default for Links<Id> {
    fn default() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
        }
    }
}

impl<Id: Copy + PartialEq> Links<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn children(&self) -> &[Id] {
        &self.children
    }

    /// True iff the child list is non-empty.
    pub fn is_parent(&self) -> bool {
        !self.children.is_empty()
    }

    /// True iff a parent is set.
    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Id>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: Id) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// Removes `child`, returning whether it was present.
    pub(crate) fn drop_child(&mut self, child: Id) -> bool {
        let before = self.children.len();
        self.children.retain(|c| *c != child);
        before != self.children.len()
    }

    pub(crate) fn take_children(&mut self) -> Vec<Id> {
        std::mem::take(&mut self.children)
    }
}

/// An entity stored in an arena that takes part in a tree.
pub trait HierarchyNode {
    type Id: Copy + PartialEq;

    fn links(&self) -> &Links<Self::Id>;

    fn links_mut(&mut self) -> &mut Links<Self::Id>;

    fn parent(&self) -> Option<Self::Id> {
        self.links().parent()
    }

    fn children(&self) -> &[Self::Id] {
        self.links().children()
    }

    fn is_parent(&self) -> bool {
        self.links().is_parent()
    }

    fn is_child(&self) -> bool {
        self.links().is_child()
    }
}
