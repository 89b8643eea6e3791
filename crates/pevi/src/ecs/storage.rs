//! # Storage — One Dense Table per Component Kind
//!
//! Every component kind owns a [`Table`]: a sparse-set keyed by entity index.
//!
//! ```text
//! sparse:   [None, Some(1), None, Some(0)]   ← entity index → dense row
//! entities: [Entity(3v0), Entity(1v2)]       ← dense row → owner
//! values:   [T,           T          ]       ← dense row → component
//! ```
//!
//! Values stay contiguous, so a query walks a plain `Vec<T>`. Removal is a
//! swap-remove: the last row moves into the hole and its sparse slot is
//! patched. Because the table is generic over `T`, nothing is type-erased and
//! no downcast can fail.
//!
//! A table may carry a cleanup hook. The world calls
//! [`Table::remove_with_hook`] when a component is removed or its entity is
//! destroyed, so the hook runs exactly once per attached instance.

use super::entity::Entity;

/// Cleanup hook run when a component instance is released by the store.
pub type CleanupHook<T> = Box<dyn FnMut(Entity, T) + Send + Sync>;

/// Dense storage for a single component kind.
pub struct Table<T> {
    sparse: Vec<Option<u32>>,
    entities: Vec<Entity>,
    values: Vec<T>,
    hook: Option<CleanupHook<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            values: Vec::new(),
            hook: None,
        }
    }
}

impl<T> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn row(&self, entity: Entity) -> Option<usize> {
        let row = (*self.sparse.get(entity.index as usize)?)? as usize;
        // The slot may belong to an older generation of the same index.
        (self.entities[row] == entity).then_some(row)
    }

    /// Insert or replace the component for `entity`. Returns the previous value.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(row) = self.row(entity) {
            return Some(std::mem::replace(&mut self.values[row], value));
        }
        let idx = entity.index as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        // Evict a row left behind by an older generation of this index.
        if let Some(stale) = self.sparse[idx] {
            self.swap_remove_row(stale as usize);
        }
        self.sparse[idx] = Some(self.values.len() as u32);
        self.entities.push(entity);
        self.values.push(value);
        None
    }

    /// Remove and return the component for `entity` without running the hook.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let row = self.row(entity)?;
        Some(self.swap_remove_row(row))
    }

    /// Remove the component for `entity`, passing it to the cleanup hook.
    ///
    /// Returns `true` if a component was present.
    pub fn remove_with_hook(&mut self, entity: Entity) -> bool {
        match self.remove(entity) {
            Some(value) => {
                if let Some(hook) = &mut self.hook {
                    hook(entity, value);
                }
                true
            }
            None => false,
        }
    }

    fn swap_remove_row(&mut self, row: usize) -> T {
        let removed = self.entities.swap_remove(row);
        let value = self.values.swap_remove(row);
        self.sparse[removed.index as usize] = None;
        if let Some(&moved) = self.entities.get(row) {
            self.sparse[moved.index as usize] = Some(row as u32);
        }
        value
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.row(entity).map(|row| &self.values[row])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.row(entity).map(|row| &mut self.values[row])
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.row(entity).is_some()
    }

    /// Owners of every stored component, in dense (iteration) order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Install the cleanup hook, replacing any previous one.
    pub fn set_hook(&mut self, hook: CleanupHook<T>) {
        self.hook = Some(hook);
    }
}
