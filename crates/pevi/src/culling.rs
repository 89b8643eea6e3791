//! Distance culling.
//!
//! An entity with a [`Transform`] and a [`BoundingSphere`] is visible when
//! the world-space center of its sphere lies closer than the cutoff to the
//! camera (or to the origin when there is no camera). Visibility is the
//! presence of the [`Visible`] tag.
//!
//! Decisions are collected during the query and applied afterwards, so the
//! tag table is never touched while it is being iterated.

use crate::components::{BoundingSphere, Transform, Visible};
use crate::context::Context;
use crate::ecs::{Entity, World};
use crate::math::Vec3;

/// Culling-phase system.
pub fn culling_system(ctx: &mut Context) {
    let eye = ctx.world.single(ctx.camera).map(|camera| camera.position());
    cull(&mut ctx.world, eye, ctx.config.cull_distance);
}

/// Toggle [`Visible`] by distance from `eye`. Returns the number of visible
/// entities.
pub fn cull(world: &mut World, eye: Option<Vec3>, cutoff: f32) -> usize {
    let eye = eye.unwrap_or(Vec3::ZERO);
    let mut decisions: Vec<(Entity, bool)> = Vec::new();
    world.query::<(&Transform, &BoundingSphere)>(|entity, (transform, bounds)| {
        let center = transform.world.transform_point3(bounds.center_offset);
        decisions.push((entity, center.distance(eye) < cutoff));
    });

    let mut visible = 0;
    for (entity, in_range) in decisions {
        let tagged = world.has::<Visible>(entity);
        if in_range {
            visible += 1;
            if !tagged {
                world.set(entity, Visible);
            }
        } else if tagged {
            world.remove::<Visible>(entity);
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;
    use crate::math::Mat4;

    fn sphere_at(world: &mut World, position: Vec3) -> Entity {
        let e = world.create();
        world.set(e, Position(position));
        world.set(e, Transform {
            local: Mat4::from_translation(position),
            world: Mat4::from_translation(position),
            dirty: false,
        });
        world.set(e, BoundingSphere::default());
        e
    }

    #[test]
    fn distance_cutoff_toggles_tag() {
        let mut world = World::new();
        let near = sphere_at(&mut world, Vec3::new(0.0, 0.0, 10.0));
        let far = sphere_at(&mut world, Vec3::new(0.0, 0.0, 500.0));
        world.set(far, Visible);

        assert_eq!(cull(&mut world, None, 200.0), 1);
        assert!(world.has::<Visible>(near));
        assert!(!world.has::<Visible>(far));
    }

    #[test]
    fn distance_is_measured_from_the_eye() {
        let mut world = World::new();
        let e = sphere_at(&mut world, Vec3::new(300.0, 0.0, 0.0));
        cull(&mut world, Some(Vec3::new(250.0, 0.0, 0.0)), 100.0);
        assert!(world.has::<Visible>(e));
        cull(&mut world, Some(Vec3::ZERO), 100.0);
        assert!(!world.has::<Visible>(e));
    }

    #[test]
    fn center_offset_is_in_local_space() {
        let mut world = World::new();
        let e = sphere_at(&mut world, Vec3::new(90.0, 0.0, 0.0));
        world.set(e, BoundingSphere {
            center_offset: Vec3::new(20.0, 0.0, 0.0),
            radius: 1.0,
        });
        cull(&mut world, None, 100.0);
        assert!(!world.has::<Visible>(e));
    }

    #[test]
    fn culling_is_idempotent() {
        let mut world = World::new();
        let entities: Vec<Entity> = (0..20)
            .map(|i| sphere_at(&mut world, Vec3::new(i as f32 * 25.0, 0.0, 0.0)))
            .collect();
        let eye = Some(Vec3::new(10.0, 5.0, 0.0));
        cull(&mut world, eye, 200.0);
        let first: Vec<bool> = entities.iter().map(|&e| world.has::<Visible>(e)).collect();
        cull(&mut world, eye, 200.0);
        let second: Vec<bool> = entities.iter().map(|&e| world.has::<Visible>(e)).collect();
        assert_eq!(first, second);
        assert!(first.contains(&true) && first.contains(&false));
    }
}
