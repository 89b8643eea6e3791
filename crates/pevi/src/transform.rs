//! # Transform Propagation
//!
//! Every entity with a [`Transform`] caches two matrices:
//!
//! ```text
//! local = T · R · S          (scale first, then rotation, then translation)
//! world = parent.world · local   if the parent has a Transform
//!       = local                  otherwise
//! ```
//!
//! [`propagate_transforms`] walks the hierarchy parents-first and recomputes
//! an entity when its own `dirty` flag is set or when its parent was just
//! recomputed, so moving a file container moves all its lines. Clean
//! subtrees are skipped.

use std::collections::HashSet;

use crate::components::{Position, Rotation, Scale, Transform};
use crate::context::Context;
use crate::ecs::{Entity, World};
use crate::math::{Mat4, Quat, Vec3};

/// Transform-phase system.
pub fn transform_system(ctx: &mut Context) {
    let updated = propagate_transforms(&mut ctx.world);
    if updated > 0 {
        log::trace!("recomputed {updated} transforms");
    }
}

/// Recompute stale world matrices. Returns how many transforms were updated.
pub fn propagate_transforms(world: &mut World) -> usize {
    let mut recomputed: HashSet<Entity> = HashSet::new();
    for entity in world.parents_first::<Transform>() {
        let parent = world.parent(entity);
        let parent_changed = parent.is_some_and(|p| recomputed.contains(&p));
        let Some(transform) = world.get::<Transform>(entity) else {
            continue;
        };
        if !transform.dirty && !parent_changed {
            continue;
        }

        let local = local_matrix(world, entity);
        let parent_world = parent
            .and_then(|p| world.get::<Transform>(p))
            .map(|t| t.world);
        if let Some(transform) = world.get_mut::<Transform>(entity) {
            transform.local = local;
            transform.world = parent_world.map_or(local, |pw| pw * local);
            transform.dirty = false;
        }
        recomputed.insert(entity);
    }
    recomputed.len()
}

/// The world matrix `entity` will have after the next propagation.
///
/// Returns the cached matrix when neither the entity nor any ancestor is
/// dirty, and composes it from the authored components otherwise. Systems
/// that run before the Transform phase use this instead of `Transform::world`.
pub fn world_matrix(world: &World, entity: Entity) -> Option<Mat4> {
    resolve(world, entity).map(|(matrix, _)| matrix)
}

/// The up-to-date world matrix, and whether it differs from the cache.
fn resolve(world: &World, entity: Entity) -> Option<(Mat4, bool)> {
    let transform = world.get::<Transform>(entity)?;
    let parent = world.parent(entity).and_then(|p| resolve(world, p));
    let stale = transform.dirty || parent.is_some_and(|(_, stale)| stale);
    if !stale {
        return Some((transform.world, false));
    }
    let local = local_matrix(world, entity);
    Some((parent.map_or(local, |(parent_world, _)| parent_world * local), true))
}

/// Compose the local matrix from whichever spatial components are present.
pub fn local_matrix(world: &World, entity: Entity) -> Mat4 {
    let translation = world.get::<Position>(entity).map_or(Vec3::ZERO, |p| p.0);
    let rotation = world.get::<Rotation>(entity).map_or(Quat::IDENTITY, |r| r.0);
    let scale = world.get::<Scale>(entity).map_or(Vec3::ONE, |s| s.0);
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}
