//! # Entity — Stable Identifiers for Phantoms, Files and Singletons
//!
//! An [`Entity`] carries no data. The [`World`](super::world::World) maps it to
//! components stored in per-kind tables.
//!
//! ## Generational Indices
//!
//! Slots are recycled after destruction, so each index is paired with a
//! **generation**. Destroying an entity bumps the generation of its slot; any
//! handle still holding the old generation is detected as dead and every
//! lookup through it returns `None`.
//!
//! ```text
//! 5v0   file container "main.c"
//! 5v1   same slot after "main.c" was destroyed and a new entity created
//! ```
//!
//! A slot is only handed out again after it has been freed, and the stale
//! handle can never alias the new occupant.

use std::fmt;
use std::marker::PhantomData;

/// Id of a phantom, a file container or a singleton.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    /// Slot index in the allocator. Recycled when the entity is destroyed.
    pub(crate) index: u32,
    /// Incremented each time this slot is reused.
    pub(crate) generation: u32,
}

impl Entity {
    /// Slot index, for logs and diagnostics.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Bumped each time the slot is recycled, so stale handles stop matching.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A typed handle to a singleton entity (the camera, the editor state).
///
/// The type parameter names the component the singleton is known for, so
/// `world.single(handle)` returns that component without a name lookup.
pub struct Handle<T> {
    entity: Entity,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(entity: Entity) -> Self {
        Self {
            entity,
            _marker: PhantomData,
        }
    }

    /// The entity behind this handle.
    pub fn entity(&self) -> Entity {
        self.entity
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = std::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "Handle<{}>({:?})", short, self.entity)
    }
}

/// Hands out entity ids and recycles freed slots.
///
/// ```text
/// generations: [0, 1, 0, 2]   ← current generation of every slot
/// free:        [1, 3]         ← freed slots, reused last-in first-out
/// ```
#[derive(Default)]
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse the most recently freed slot, or grow by one.
    pub fn allocate(&mut self) -> Entity {
        match self.free.pop() {
            Some(index) => Entity {
                index,
                generation: self.generations[index as usize],
            },
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity { index, generation: 0 }
            }
        }
    }

    /// Retire `entity`. Stale or unknown ids are rejected with `false`.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&generation| generation == entity.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free.len()
    }

    #[cfg(any(feature = "diagnostics", test))]
    pub(crate) fn free_count(&self) -> usize {
        self.free.len()
    }

    #[cfg(any(feature = "diagnostics", test))]
    pub(crate) fn total_slots(&self) -> u32 {
        self.generations.len() as u32
    }
}
