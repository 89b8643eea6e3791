//! # Relations — Typed Edges Between Code Elements
//!
//! Besides parent/child, entities can be linked by semantic edges: a source
//! file *includes* a header, a function *references* another. Edges are
//! many-to-many and carry nothing but their [`RelationKind`].
//!
//! ```text
//! main.c ──Includes──▶ stdio.h
//! main   ──References─▶ printf ──Contains──▶ stdio.h
//! ```
//!
//! [`arrange_layered`] turns the edges of one kind into a spatial layout:
//! everything reachable from a root is placed in depth layers below it.

use std::collections::{HashMap, HashSet};

use super::entity::Entity;
use super::world::World;
use crate::components::Position;
use crate::math::Vec3;

/// The kind of a semantic edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    References,
    Contains,
    Imports,
    Includes,
    Targets,
}

/// Outgoing edges per (source, kind), in insertion order.
#[derive(Default)]
pub(crate) struct Relations {
    edges: HashMap<(Entity, RelationKind), Vec<Entity>>,
}

impl Relations {
    /// Returns `false` if the edge already existed.
    pub fn insert(&mut self, from: Entity, kind: RelationKind, to: Entity) -> bool {
        let targets = self.edges.entry((from, kind)).or_default();
        if targets.contains(&to) {
            return false;
        }
        targets.push(to);
        true
    }

    pub fn remove(&mut self, from: Entity, kind: RelationKind, to: Entity) -> bool {
        let Some(targets) = self.edges.get_mut(&(from, kind)) else {
            return false;
        };
        let before = targets.len();
        targets.retain(|&t| t != to);
        let removed = targets.len() != before;
        if targets.is_empty() {
            self.edges.remove(&(from, kind));
        }
        removed
    }

    pub fn targets(&self, from: Entity, kind: RelationKind) -> &[Entity] {
        self.edges
            .get(&(from, kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sources(&self, to: Entity, kind: RelationKind) -> Vec<Entity> {
        let mut sources: Vec<Entity> = self
            .edges
            .iter()
            .filter(|((_, k), targets)| *k == kind && targets.contains(&to))
            .map(|((from, _), _)| *from)
            .collect();
        sources.sort();
        sources
    }

    /// Drop every edge that starts or ends at `entity`.
    pub fn forget(&mut self, entity: Entity) {
        self.edges.retain(|(from, _), targets| {
            if *from == entity {
                return false;
            }
            targets.retain(|&t| t != entity);
            !targets.is_empty()
        });
    }
}

/// Place everything reachable from `root` through `kind` edges in layers.
///
/// Layer `d` sits `d * spacing` below the root. Within a layer entities are
/// spread along X, centered on the root. An entity reachable by several
/// paths lands in the shallowest layer. The root keeps its position.
///
/// Returns the layers, root first.
pub fn arrange_layered(
    world: &mut World,
    root: Entity,
    kind: RelationKind,
    spacing: f32,
) -> Vec<Vec<Entity>> {
    if !world.is_alive(root) {
        return Vec::new();
    }
    let origin = world.get::<Position>(root).map_or(Vec3::ZERO, |p| p.0);

    let mut seen = HashSet::from([root]);
    let mut layers = vec![vec![root]];
    loop {
        let mut next = Vec::new();
        for &entity in layers.last().into_iter().flatten() {
            for &target in world.related(entity, kind) {
                if seen.insert(target) {
                    next.push(target);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        layers.push(next);
    }

    for (depth, layer) in layers.iter().enumerate().skip(1) {
        let half_width = (layer.len() as f32 - 1.0) * 0.5;
        for (i, &entity) in layer.iter().enumerate() {
            let offset = Vec3::new(
                (i as f32 - half_width) * spacing,
                -(depth as f32) * spacing,
                0.0,
            );
            world.set(entity, Position(origin + offset));
        }
    }
    log::debug!(
        "arranged {} layers of {kind:?} edges below {root}",
        layers.len()
    );
    layers
}
