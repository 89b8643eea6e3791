//! # World — The Entity/Component Store
//!
//! The [`World`] owns every entity, every component and every edge between
//! entities. It's the single source of truth the frame pipeline reads and
//! writes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ World                                               │
//! │                                                     │
//! │  EntityAllocator: generational ids, slot recycling  │
//! │                                                     │
//! │  components: Components                             │
//! │    one Table<T> per kind (position, transform, ...) │
//! │                                                     │
//! │  hierarchy: parent/child forest                     │
//! │  relations: typed semantic edges                    │
//! │  prefabs:   templates skipped by queries            │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dirty tracking
//!
//! Writing a spatial kind ([`Position`](crate::components::Position),
//! [`Rotation`](crate::components::Rotation),
//! [`Scale`](crate::components::Scale)) through [`set`](World::set),
//! [`get_mut`](World::get_mut), [`remove`](World::remove) or a `&mut` query
//! marks the entity's [`Transform`] dirty. So does changing its parent.
//!
//! ## Structural lock
//!
//! While the schedule runs a system the world is structurally locked:
//! creating or destroying entities and editing edges panics. Systems queue
//! those changes on [`Commands`](super::commands::Commands) instead, and the
//! schedule applies them at the next phase boundary.

use std::collections::{HashMap, HashSet};

use super::component::{Component, Components};
use super::entity::{Entity, EntityAllocator, Handle};
use super::hierarchy::{Hierarchy, HierarchyError};
use super::query::{QueryParam, assert_distinct_kinds};
use super::relation::{RelationKind, Relations};
use crate::components::{FileReference, Name, TextContent, Transform};

/// The entity/component store.
pub struct World {
    allocator: EntityAllocator,
    pub(super) components: Components,
    pub(super) hierarchy: Hierarchy,
    pub(super) relations: Relations,
    /// Template entities. Alive, but never yielded by queries.
    pub(super) prefabs: HashSet<Entity>,
    /// Instance → the prefab it was stamped from.
    pub(super) instances: HashMap<Entity, Entity>,
    structure_locked: bool,
    #[cfg(feature = "diagnostics")]
    created_this_frame: u32,
    #[cfg(feature = "diagnostics")]
    destroyed_this_frame: u32,
}

/// Entity pool statistics for one frame.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldStats {
    pub alive: usize,
    pub free_slots: usize,
    pub total_slots: u32,
    pub created: u32,
    pub destroyed: u32,
}

impl World {
    pub fn new() -> Self {
        let mut world = Self {
            allocator: EntityAllocator::new(),
            components: Components::default(),
            hierarchy: Hierarchy::default(),
            relations: Relations::default(),
            prefabs: HashSet::new(),
            instances: HashMap::new(),
            structure_locked: false,
            #[cfg(feature = "diagnostics")]
            created_this_frame: 0,
            #[cfg(feature = "diagnostics")]
            destroyed_this_frame: 0,
        };
        world.set_cleanup_hook(|entity, text: TextContent| {
            log::trace!("released text of {entity} ({} bytes)", text.text().len());
        });
        world.set_cleanup_hook(|entity, file: FileReference| {
            log::debug!(
                "released file reference {}:{} of {entity}",
                file.path().display(),
                file.line_number
            );
        });
        world
    }

    // ── Entity Management ────────────────────────────────────────────

    /// Returns the number of alive entities, prefabs included.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Check if an entity is alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Create an entity with no components.
    ///
    /// # Panics
    ///
    /// Panics while the structure is locked by a running system.
    pub fn create(&mut self) -> Entity {
        self.assert_unlocked("create");
        let entity = self.allocator.allocate();
        #[cfg(feature = "diagnostics")]
        {
            self.created_this_frame += 1;
        }
        entity
    }

    /// Create an entity parented under `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the parent is not alive.
    pub fn create_child(&mut self, parent: Entity) -> Entity {
        assert!(
            self.is_alive(parent),
            "Cannot create child on dead parent {parent:?}"
        );
        let child = self.create();
        self.hierarchy.attach(child, parent);
        child
    }

    /// Create a singleton entity holding `value` and return a typed handle to it.
    pub fn create_singleton<T: Component>(&mut self, value: T) -> Handle<T> {
        let entity = self.create();
        self.set(entity, value);
        Handle::new(entity)
    }

    /// Destroy an entity and all its descendants.
    ///
    /// Cleanup hooks run once for every component released. Destroying a dead
    /// entity is a no-op and returns `false`.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        self.assert_unlocked("destroy");
        if !self.is_alive(entity) {
            return false;
        }
        self.hierarchy.detach(entity);
        let doomed = self.hierarchy.subtree(entity);
        for &e in &doomed {
            let released = self.components.release(e);
            log::trace!("destroyed {e} ({released} components)");
            self.hierarchy.forget(e);
            self.relations.forget(e);
            self.prefabs.remove(&e);
            self.instances.remove(&e);
            self.allocator.deallocate(e);
        }
        #[cfg(feature = "diagnostics")]
        {
            self.destroyed_this_frame += doomed.len() as u32;
        }
        true
    }

    // ── Per-Entity Component Access ──────────────────────────────────

    /// Attach `value` to `entity`, replacing and returning any previous value.
    ///
    /// Setting a component on a dead entity is logged and ignored. The
    /// replaced value goes back to the caller, so no cleanup hook runs on it.
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) -> Option<T> {
        if !self.is_alive(entity) {
            log::warn!("ignoring {} set on dead entity {entity:?}", T::KIND);
            return None;
        }
        let previous = T::table_mut(&mut self.components).insert(entity, value);
        if T::SPATIAL {
            self.mark_transform_dirty(entity);
        }
        previous
    }

    /// Get a shared reference to a component.
    ///
    /// Returns `None` if the entity is dead or doesn't have the component.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        T::table(&self.components).get(entity)
    }

    /// Get a mutable reference to a component.
    ///
    /// Borrowing a spatial kind mutably marks the entity's transform dirty.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        if T::SPATIAL && T::table(&self.components).contains(entity) {
            self.mark_transform_dirty(entity);
        }
        T::table_mut(&mut self.components).get_mut(entity)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Remove a component, running its cleanup hook.
    ///
    /// Returns `true` if the component was present and removed.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let removed = T::table_mut(&mut self.components).remove_with_hook(entity);
        if removed && T::SPATIAL {
            self.mark_transform_dirty(entity);
        }
        removed
    }

    /// Install the cleanup hook for kind `T`, replacing the previous one.
    ///
    /// The hook receives every instance the store releases: on
    /// [`remove`](World::remove) and on [`destroy`](World::destroy).
    pub fn set_cleanup_hook<T: Component>(
        &mut self,
        hook: impl FnMut(Entity, T) + Send + Sync + 'static,
    ) {
        T::table_mut(&mut self.components).set_hook(Box::new(hook));
    }

    pub(crate) fn mark_transform_dirty(&mut self, entity: Entity) {
        if let Some(transform) = self.components.transform.get_mut(entity) {
            transform.dirty = true;
        }
    }

    // ── Singletons ───────────────────────────────────────────────────

    /// The component a singleton handle points at, if it is still alive.
    pub fn single<T: Component>(&self, handle: Handle<T>) -> Option<&T> {
        self.get(handle.entity())
    }

    pub fn single_mut<T: Component>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.get_mut(handle.entity())
    }

    // ── Names ────────────────────────────────────────────────────────

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.get::<Name>(entity).map(Name::as_str)
    }

    /// The first child of `parent` carrying `name`.
    pub fn child_named(&self, parent: Entity, name: &str) -> Option<Entity> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.name(child) == Some(name))
    }

    // ── Hierarchy ────────────────────────────────────────────────────

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.hierarchy.parent(entity)
    }

    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.hierarchy.children(entity)
    }

    /// Parent `child` under `parent`, replacing any previous parent.
    ///
    /// The child's transform is marked dirty.
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> Result<(), HierarchyError> {
        self.assert_unlocked("set_parent");
        for entity in [child, parent] {
            if !self.is_alive(entity) {
                return Err(HierarchyError::DeadEntity(entity));
            }
        }
        if child == parent {
            return Err(HierarchyError::SelfParent(child));
        }
        if self.hierarchy.is_ancestor_or_self(child, parent) {
            return Err(HierarchyError::Cycle { child, parent });
        }
        self.hierarchy.attach(child, parent);
        self.mark_transform_dirty(child);
        Ok(())
    }

    /// Make `child` a root again. Returns its former parent.
    pub fn remove_parent(&mut self, child: Entity) -> Option<Entity> {
        self.assert_unlocked("remove_parent");
        let parent = self.hierarchy.detach(child)?;
        self.mark_transform_dirty(child);
        Some(parent)
    }

    /// Every alive entity holding `T`, ordered so parents come before children.
    pub(crate) fn parents_first<T: Component>(&self) -> Vec<Entity> {
        let table = T::table(&self.components);
        let roots = table.entities().iter().copied().filter(|&e| {
            !self.prefabs.contains(&e)
                && self.parent(e).is_none_or(|p| !table.contains(p))
        });
        self.hierarchy
            .breadth_first(roots)
            .into_iter()
            .filter(|&e| table.contains(e))
            .collect()
    }

    // ── Relations ────────────────────────────────────────────────────

    /// Add a `kind` edge from `from` to `to`. Returns `false` if it already
    /// existed or either end is dead.
    pub fn relate(&mut self, from: Entity, kind: RelationKind, to: Entity) -> bool {
        self.assert_unlocked("relate");
        if !self.is_alive(from) || !self.is_alive(to) {
            log::warn!("ignoring {kind:?} edge {from:?} -> {to:?}: dead endpoint");
            return false;
        }
        self.relations.insert(from, kind, to)
    }

    pub fn unrelate(&mut self, from: Entity, kind: RelationKind, to: Entity) -> bool {
        self.assert_unlocked("unrelate");
        self.relations.remove(from, kind, to)
    }

    /// Targets of `kind` edges leaving `from`, in insertion order.
    pub fn related(&self, from: Entity, kind: RelationKind) -> &[Entity] {
        self.relations.targets(from, kind)
    }

    /// Sources of `kind` edges arriving at `to`.
    pub fn related_from(&self, to: Entity, kind: RelationKind) -> Vec<Entity> {
        self.relations.sources(to, kind)
    }

    // ── Structural lock ──────────────────────────────────────────────

    pub(crate) fn set_structure_locked(&mut self, locked: bool) {
        self.structure_locked = locked;
    }

    pub fn is_structure_locked(&self) -> bool {
        self.structure_locked
    }

    fn assert_unlocked(&self, operation: &str) {
        assert!(
            !self.structure_locked,
            "`World::{operation}` called while a system is running; queue it on `Commands`"
        );
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Every live entity that has a component of kind `T`. Prefabs are skipped.
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        T::table(&self.components)
            .entities()
            .iter()
            .copied()
            .filter(|e| !self.prefabs.contains(e))
            .collect()
    }

    /// Visit every live entity holding all the requested kinds.
    ///
    /// The visiting order is fixed when the query starts. Prefabs are skipped.
    ///
    /// # Panics
    ///
    /// Panics if the same kind is requested twice.
    ///
    /// # Example
    ///
    /// ```ignore
    /// world.query::<(&mut Position, &TextContent)>(|entity, (pos, text)| {
    ///     pos.0.y += 1.0;
    /// });
    /// ```
    pub fn query<Q: QueryParam>(&mut self, f: impl FnMut(Entity, Q::Item<'_>)) {
        self.run_query::<Q>(|_, _| true, f);
    }

    /// Query with an additional filter: only entities that also have `F`.
    ///
    /// The filter component is not yielded, only checked for presence.
    pub fn query_filtered<Q: QueryParam, F: Component>(
        &mut self,
        f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        assert!(
            !Q::kinds().contains(&F::KIND),
            "query filter `{}` is also a fetched kind",
            F::KIND
        );
        self.run_query::<Q>(|components, e| F::table(components).contains(e), f);
    }

    fn run_query<Q: QueryParam>(
        &mut self,
        filter: impl Fn(&Components, Entity) -> bool,
        mut f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        assert_distinct_kinds(&Q::kinds());
        let mut cols = Q::extract(&mut self.components);
        let candidates = Q::candidates(&cols).to_vec();
        let mut touched = Vec::new();
        for entity in candidates {
            if self.prefabs.contains(&entity) {
                continue;
            }
            if !filter(&self.components, entity) {
                continue;
            }
            if let Some(item) = Q::fetch(&mut cols, entity) {
                f(entity, item);
                if Q::writes_spatial() {
                    touched.push(entity);
                }
            }
        }
        Q::restore(cols, &mut self.components);
        for entity in touched {
            self.mark_transform_dirty(entity);
        }
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Collect entity pool statistics and reset per-frame counters.
    #[cfg(feature = "diagnostics")]
    pub fn take_frame_stats(&mut self) -> WorldStats {
        let stats = WorldStats {
            alive: self.allocator.alive_count(),
            free_slots: self.allocator.free_count(),
            total_slots: self.allocator.total_slots(),
            created: self.created_this_frame,
            destroyed: self.destroyed_this_frame,
        };
        self.created_this_frame = 0;
        self.destroyed_this_frame = 0;
        stats
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
