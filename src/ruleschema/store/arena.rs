//! Insertion-ordered entity storage addressed by opaque ids.
//!
//! Ids are handed out from a counter and never reused within a document, so a
//! stale id held by a collaborator can only miss, never alias another entity.
//!
//! The tree operations here are generic over [`HierarchyNode`] and are shared
//! by the object, property-set and attribute hierarchies. Traversals are
//! iterative and carry a visited set, so a corrupt (cyclic) link structure
//! terminates instead of looping.

use crate::error::{Result, SchemaError};
use crate::hierarchy::HierarchyNode;
use crate::model::EntityRef;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

/// An opaque handle into an [`Arena`].
pub trait EntityId: Copy + Eq + Hash + Debug + Into<EntityRef> {
    fn from_raw(raw: u64) -> Self;

    fn raw(self) -> u64;
}

#[derive(Debug, Clone)]
pub struct Arena<Id, T> {
    items: IndexMap<Id, T>,
    next: u64,
}

impl<Id: EntityId, T> Default for Arena<Id, T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            next: 1,
        }
    }
}

impl<Id: EntityId, T> Arena<Id, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: T) -> Id {
        let id = Id::from_raw(self.next);
        self.next += 1;
        self.items.insert(id, item);
        id
    }

    pub fn get(&self, id: Id) -> Result<&T> {
        self.items
            .get(&id)
            .ok_or_else(|| SchemaError::EntityNotFound(id.into()))
    }

    pub fn get_mut(&mut self, id: Id) -> Result<&mut T> {
        self.items
            .get_mut(&id)
            .ok_or_else(|| SchemaError::EntityNotFound(id.into()))
    }

    /// Removes the record, keeping the order of the remaining ones.
    pub fn remove(&mut self, id: Id) -> Option<T> {
        self.items.shift_remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.next = 1;
    }
}

impl<Id, T> Arena<Id, T>
where
    Id: EntityId,
    T: HierarchyNode<Id = Id>,
{
    pub fn parent_of(&self, id: Id) -> Result<Option<Id>> {
        Ok(self.get(id)?.parent())
    }

    pub fn children_of(&self, id: Id) -> Result<Vec<Id>> {
        Ok(self.get(id)?.children().to_vec())
    }

    /// Appends `child` to `parent` and points `child` back at it.
    ///
    /// A child that already has a parent is detached from it first. No cycle
    /// check is made here; see [`Arena::ensure_acyclic`].
    pub fn add_child(&mut self, parent: Id, child: Id) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        self.detach(child)?;
        self.get_mut(parent)?.links_mut().push_child(child);
        self.get_mut(child)?.links_mut().set_parent(Some(parent));
        Ok(())
    }

    /// Removes `child` from `parent`'s list and clears its parent link.
    pub fn remove_child(&mut self, parent: Id, child: Id) -> Result<()> {
        self.get(child)?;
        if !self.get_mut(parent)?.links_mut().drop_child(child) {
            return Err(SchemaError::NotAMember {
                item: child.into(),
                container: parent.into(),
            });
        }
        self.get_mut(child)?.links_mut().set_parent(None);
        Ok(())
    }

    /// Clears the parent link of `id`, if any. Returns the former parent.
    pub fn detach(&mut self, id: Id) -> Result<Option<Id>> {
        let parent = self.get(id)?.parent();
        if let Some(parent) = parent {
            if let Ok(p) = self.get_mut(parent) {
                p.links_mut().drop_child(id);
            }
            self.get_mut(id)?.links_mut().set_parent(None);
        }
        Ok(parent)
    }

    /// Clears the parent link of every child of `id`, returning them.
    pub fn orphan_children(&mut self, id: Id) -> Result<Vec<Id>> {
        let children = self.get_mut(id)?.links_mut().take_children();
        for child in &children {
            if let Ok(c) = self.get_mut(*child) {
                c.links_mut().set_parent(None);
            }
        }
        Ok(children)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: Id) -> Result<Vec<Id>> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.get(id)?.parent();
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            out.push(parent);
            current = self.items.get(&parent).and_then(|p| p.parent());
        }
        Ok(out)
    }

    /// All descendants of `id` in breadth-first order, excluding `id`.
    pub fn descendants(&self, id: Id) -> Result<Vec<Id>> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue: VecDeque<Id> = self.get(id)?.children().iter().copied().collect();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            if let Some(item) = self.items.get(&next) {
                queue.extend(item.children().iter().copied());
            }
        }
        Ok(out)
    }

    /// Rejects `new_parent` if it is `node` itself or one of its descendants.
    pub fn ensure_acyclic(&self, node: Id, new_parent: Id) -> Result<()> {
        self.get(new_parent)?;
        if node == new_parent || self.ancestors(new_parent)?.contains(&node) {
            return Err(SchemaError::CyclicParent {
                node: node.into(),
                parent: new_parent.into(),
            });
        }
        Ok(())
    }
}
