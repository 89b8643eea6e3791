//! # Commands — Deferred Structural Changes
//!
//! Systems may read and write components freely, but creating or destroying
//! entities and editing edges would invalidate other systems' view of the
//! store mid-frame. Those changes are queued here and applied in order when
//! the schedule crosses a phase boundary.
//!
//! ```ignore
//! fn spawn_marker(ctx: &mut Context) {
//!     ctx.commands.spawn(|world, marker| {
//!         world.set(marker, Position(Vec3::ZERO));
//!     });
//! }
//! ```

use super::entity::Entity;
use super::relation::RelationKind;
use super::world::World;

type SpawnFn = Box<dyn FnOnce(&mut World, Entity) + Send>;

/// A queued structural change.
pub enum Command {
    Spawn { parent: Option<Entity>, init: SpawnFn },
    Destroy(Entity),
    SetParent { child: Entity, parent: Entity },
    RemoveParent(Entity),
    Relate { from: Entity, kind: RelationKind, to: Entity },
    Unrelate { from: Entity, kind: RelationKind, to: Entity },
}

/// A FIFO queue of [`Command`]s.
#[derive(Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity at the next phase boundary and pass it to `init`.
    pub fn spawn(&mut self, init: impl FnOnce(&mut World, Entity) + Send + 'static) {
        self.queue.push(Command::Spawn {
            parent: None,
            init: Box::new(init),
        });
    }

    /// Like [`spawn`](Commands::spawn), parented under `parent`.
    ///
    /// Dropped with a warning if the parent is gone by then.
    pub fn spawn_child(
        &mut self,
        parent: Entity,
        init: impl FnOnce(&mut World, Entity) + Send + 'static,
    ) {
        self.queue.push(Command::Spawn {
            parent: Some(parent),
            init: Box::new(init),
        });
    }

    pub fn destroy(&mut self, entity: Entity) {
        self.queue.push(Command::Destroy(entity));
    }

    pub fn set_parent(&mut self, child: Entity, parent: Entity) {
        self.queue.push(Command::SetParent { child, parent });
    }

    pub fn remove_parent(&mut self, child: Entity) {
        self.queue.push(Command::RemoveParent(child));
    }

    pub fn relate(&mut self, from: Entity, kind: RelationKind, to: Entity) {
        self.queue.push(Command::Relate { from, kind, to });
    }

    pub fn unrelate(&mut self, from: Entity, kind: RelationKind, to: Entity) {
        self.queue.push(Command::Unrelate { from, kind, to });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Apply every queued command in order. Returns how many were applied.
    ///
    /// Commands whose entities died in the meantime are skipped.
    pub fn apply(&mut self, world: &mut World) -> usize {
        let count = self.queue.len();
        for command in self.queue.drain(..) {
            match command {
                Command::Spawn { parent, init } => {
                    let entity = match parent {
                        Some(parent) if !world.is_alive(parent) => {
                            log::warn!("dropping queued spawn under dead parent {parent:?}");
                            continue;
                        }
                        Some(parent) => world.create_child(parent),
                        None => world.create(),
                    };
                    init(world, entity);
                }
                Command::Destroy(entity) => {
                    world.destroy(entity);
                }
                Command::SetParent { child, parent } => {
                    if let Err(err) = world.set_parent(child, parent) {
                        log::warn!("queued set_parent rejected: {err}");
                    }
                }
                Command::RemoveParent(child) => {
                    world.remove_parent(child);
                }
                Command::Relate { from, kind, to } => {
                    world.relate(from, kind, to);
                }
                Command::Unrelate { from, kind, to } => {
                    world.unrelate(from, kind, to);
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Name;

    #[test]
    fn commands_apply_in_order() {
        let mut world = World::new();
        let root = world.create();
        let mut commands = Commands::new();
        commands.spawn_child(root, |world, e| {
            world.set(e, Name::new("child"));
        });
        commands.destroy(root);
        assert_eq!(commands.len(), 2);

        assert_eq!(commands.apply(&mut world), 2);
        assert!(commands.is_empty());
        // The child was created first, then destroyed with its parent.
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn spawn_under_dead_parent_is_dropped() {
        let mut world = World::new();
        let parent = world.create();
        world.destroy(parent);
        let mut commands = Commands::new();
        commands.spawn_child(parent, |world, e| {
            world.set(e, Name::new("orphan"));
        });
        commands.apply(&mut world);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn rejected_parent_edge_is_skipped() {
        let mut world = World::new();
        let a = world.create();
        let b = world.create_child(a);
        let mut commands = Commands::new();
        commands.set_parent(a, b);
        commands.relate(a, RelationKind::Targets, b);
        commands.apply(&mut world);
        assert_eq!(world.parent(a), None);
        assert_eq!(world.related(a, RelationKind::Targets), &[b]);
    }
}
