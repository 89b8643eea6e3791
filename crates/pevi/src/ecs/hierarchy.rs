//! # Entity Hierarchies — Parent/Child Edges
//!
//! Parent/child links are edges held by the world, separate from component
//! storage. They drive two things:
//!
//! - transform propagation (`child.world = parent.world * child.local`),
//! - lifetime cascading (destroying a parent destroys every descendant).
//!
//! The edges always form a forest: an entity has at most one parent, and
//! [`World::set_parent`](super::World::set_parent) rejects an edge that would
//! close a cycle.
//!
//! ## Usage
//!
//! ```ignore
//! let file = world.create();
//! let line = world.create_child(file);
//! assert_eq!(world.parent(line), Some(file));
//! world.destroy(file); // line goes too
//! ```

use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use super::entity::Entity;

/// Why a parent/child edge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),
    #[error("entity {0} cannot be its own parent")]
    SelfParent(Entity),
    #[error("parenting {child} under {parent} would create a cycle")]
    Cycle { child: Entity, parent: Entity },
}

/// Parent and child adjacency for every entity that has either.
#[derive(Default)]
pub(crate) struct Hierarchy {
    parents: HashMap<Entity, Entity>,
    children: HashMap<Entity, Vec<Entity>>,
}

impl Hierarchy {
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.parents.get(&entity).copied()
    }

    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.children.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `true` if `ancestor` is `entity` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut current = Some(entity);
        while let Some(e) = current {
            if e == ancestor {
                return true;
            }
            current = self.parent(e);
        }
        false
    }

    /// Link `child` under `parent`, detaching it from any previous parent.
    ///
    /// The caller has already ruled out cycles.
    pub fn attach(&mut self, child: Entity, parent: Entity) {
        self.detach(child);
        self.parents.insert(child, parent);
        self.children.entry(parent).or_default().push(child);
    }

    /// Unlink `child` from its parent. Returns the old parent.
    pub fn detach(&mut self, child: Entity) -> Option<Entity> {
        let parent = self.parents.remove(&child)?;
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|&c| c != child);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
        Some(parent)
    }

    /// `root` followed by all its descendants, breadth-first.
    pub fn subtree(&self, root: Entity) -> Vec<Entity> {
        let mut order = vec![root];
        let mut i = 0;
        while i < order.len() {
            order.extend_from_slice(self.children(order[i]));
            i += 1;
        }
        order
    }

    /// Visit entities parents-first, starting from the given roots.
    pub fn breadth_first(&self, roots: impl IntoIterator<Item = Entity>) -> Vec<Entity> {
        let mut order = Vec::new();
        let mut queue: VecDeque<Entity> = roots.into_iter().collect();
        while let Some(entity) = queue.pop_front() {
            order.push(entity);
            queue.extend(self.children(entity).iter().copied());
        }
        order
    }

    /// Drop every edge touching `entity`. Its children become roots.
    pub fn forget(&mut self, entity: Entity) {
        self.detach(entity);
        if let Some(children) = self.children.remove(&entity) {
            for child in children {
                self.parents.remove(&child);
            }
        }
    }
}
