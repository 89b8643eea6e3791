//! # Prefabs — Templates Stamped Into Instances
//!
//! A prefab is an ordinary entity the world flags as a template: it keeps its
//! components, but queries never yield it, so no system treats it as live.
//! [`World::instantiate`] copies the prefab's components onto a new entity,
//! after which the instance owns its data and can override any of it.
//!
//! Prefabs may carry named child **slots**. Every instance gets its own copy
//! of each slot, found again through [`World::slot`]:
//!
//! ```ignore
//! let file = world.create_prefab();
//! world.set(file, TextContent::new("file.c").with_font_size(2.0));
//! let header = world.create_prefab_slot(file, "HeaderSection");
//! world.set(header, TextContent::new("#include"));
//!
//! let main_c = world.instantiate(file).unwrap();
//! let header = world.slot(main_c, "HeaderSection").unwrap();
//! world.set(header, TextContent::new("#include <stdio.h>"));
//! ```

use super::entity::Entity;
use super::world::World;
use crate::components::Name;

impl World {
    /// Create an empty prefab.
    pub fn create_prefab(&mut self) -> Entity {
        let prefab = self.create();
        self.prefabs.insert(prefab);
        prefab
    }

    /// Create a named child slot on a prefab (or on another slot).
    ///
    /// # Panics
    ///
    /// Panics if `prefab` is not a prefab.
    pub fn create_prefab_slot(&mut self, prefab: Entity, name: &str) -> Entity {
        assert!(
            self.is_prefab(prefab),
            "{prefab:?} is not a prefab; slots can only be added to prefabs"
        );
        let slot = self.create_child(prefab);
        self.prefabs.insert(slot);
        self.set(slot, Name::new(name));
        slot
    }

    pub fn is_prefab(&self, entity: Entity) -> bool {
        self.is_alive(entity) && self.prefabs.contains(&entity)
    }

    /// The prefab an instance was stamped from.
    pub fn prefab_of(&self, instance: Entity) -> Option<Entity> {
        self.instances
            .get(&instance)
            .copied()
            .filter(|&prefab| self.is_alive(prefab))
    }

    /// Stamp a live instance of `prefab`, slots included.
    ///
    /// The instance's transform starts dirty. Returns `None` if `prefab` is
    /// not a prefab.
    pub fn instantiate(&mut self, prefab: Entity) -> Option<Entity> {
        if !self.is_prefab(prefab) {
            log::warn!("cannot instantiate {prefab:?}: not a prefab");
            return None;
        }
        let instance = self.create();
        self.stamp(prefab, instance);
        Some(instance)
    }

    fn stamp(&mut self, prefab: Entity, instance: Entity) {
        self.components.copy_all(prefab, instance);
        self.mark_transform_dirty(instance);
        self.instances.insert(instance, prefab);
        let slots = self.children(prefab).to_vec();
        for slot in slots {
            if !self.prefabs.contains(&slot) {
                continue;
            }
            let copy = self.create_child(instance);
            self.stamp(slot, copy);
        }
    }

    /// The copy of slot `name` under `instance`.
    pub fn slot(&self, instance: Entity, name: &str) -> Option<Entity> {
        self.child_named(instance, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Position, TextContent, Transform};
    use crate::math::{Color, Vec3};

    fn settle(world: &mut World, entity: Entity) {
        if let Some(transform) = world.get_mut::<Transform>(entity) {
            transform.dirty = false;
        }
    }

    fn file_prefab(world: &mut World) -> Entity {
        let prefab = world.create_prefab();
        world.set(prefab, TextContent::new("file.c").with_font_size(2.0).with_color(Color::BLUE));
        world.set(prefab, Position::default());
        world.set(prefab, Transform::default());
        let header = world.create_prefab_slot(prefab, "HeaderSection");
        world.set(header, TextContent::new("#include").with_color(Color::PURPLE));
        world.set(header, Position(Vec3::new(0.0, 3.0, 0.0)));
        world.create_prefab_slot(prefab, "FunctionSection");
        prefab
    }

    #[test]
    fn prefabs_are_not_queried() {
        let mut world = World::new();
        let prefab = file_prefab(&mut world);
        let instance = world.instantiate(prefab).unwrap();

        let mut seen = Vec::new();
        world.query::<(&TextContent,)>(|e, _| seen.push(e));
        let header = world.slot(instance, "HeaderSection").unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&instance));
        assert!(seen.contains(&header));
        assert!(world.entities_with::<TextContent>().iter().all(|e| !world.is_prefab(*e)));
    }

    #[test]
    fn instance_copies_components_and_can_override() {
        let mut world = World::new();
        let prefab = file_prefab(&mut world);
        let a = world.instantiate(prefab).unwrap();
        let b = world.instantiate(prefab).unwrap();

        if let Some(text) = world.get_mut::<TextContent>(a) {
            text.set_text("main.c");
        }
        assert_eq!(world.get::<TextContent>(a).map(TextContent::text), Some("main.c"));
        assert_eq!(world.get::<TextContent>(b).map(TextContent::text), Some("file.c"));
        assert_eq!(world.get::<TextContent>(prefab).map(TextContent::text), Some("file.c"));
        assert_eq!(world.get::<TextContent>(b).map(|t| t.font_size), Some(2.0));
        assert_eq!(world.prefab_of(a), Some(prefab));
    }

    #[test]
    fn slots_are_copied_per_instance() {
        let mut world = World::new();
        let prefab = file_prefab(&mut world);
        let a = world.instantiate(prefab).unwrap();
        let b = world.instantiate(prefab).unwrap();

        let header_a = world.slot(a, "HeaderSection").unwrap();
        let header_b = world.slot(b, "HeaderSection").unwrap();
        assert_ne!(header_a, header_b);
        assert_eq!(world.parent(header_a), Some(a));
        assert!(world.slot(a, "FunctionSection").is_some());
        assert_eq!(world.slot(a, "Missing"), None);

        world.set(header_a, TextContent::new("#include <stdio.h>"));
        assert_eq!(
            world.get::<TextContent>(header_b).map(TextContent::text),
            Some("#include")
        );
    }

    #[test]
    fn instance_transform_starts_dirty() {
        let mut world = World::new();
        let prefab = file_prefab(&mut world);
        settle(&mut world, prefab);
        let instance = world.instantiate(prefab).unwrap();
        assert!(world.get::<Transform>(instance).is_some_and(|t| t.dirty));
    }

    #[test]
    fn instantiate_rejects_live_entity() {
        let mut world = World::new();
        let live = world.create();
        assert_eq!(world.instantiate(live), None);
    }

    #[test]
    fn destroying_instance_keeps_prefab() {
        let mut world = World::new();
        let prefab = file_prefab(&mut world);
        let instance = world.instantiate(prefab).unwrap();
        world.destroy(instance);
        assert!(world.is_prefab(prefab));
        assert!(world.instantiate(prefab).is_some());
    }
}
