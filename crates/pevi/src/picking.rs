//! # Picking — Pointer Ray to Selected Entity
//!
//! On a left press in Navigation mode, a ray is cast from the camera through
//! the pointer and tested against the world-space bounding sphere of every
//! candidate. The nearest positive hit becomes the focused entity.
//!
//! ```text
//! pointer (normalized) ──▶ CameraController::picking_ray ──▶ Ray
//!                                                            │
//!   for each (Transform, BoundingSphere[, TextContent]):     ▼
//!       center = world · center_offset                 ray_sphere
//!       (world recomposed if the entity or an ancestor is dirty)
//!       radius = radius · max axis scale                     │
//!                                                            ▼
//!                                            nearest t ──▶ select()
//! ```
//!
//! Ties keep the first entity in query order. Query order depends on the
//! store's history, so equal-distance ties are effectively arbitrary.
//!
//! A miss changes nothing: the previous focus stays.
//!
//! ## Highlight
//!
//! A selected label turns yellow and faces the camera. Its previous look is
//! kept in a [`Highlight`] component and restored on deselection.

use crate::components::{
    BoundingSphere, EditorMode, EditorState, Highlight, Selected, TextContent, Transform,
};
use crate::context::Context;
use crate::ecs::{Entity, Handle, World};
use crate::input::MouseButton;
use crate::math::{Color, Ray, max_axis_scale, ray_sphere};
use crate::transform::world_matrix;

/// Input-phase system: pick on left press in Navigation mode.
pub fn picking_system(ctx: &mut Context) {
    if !ctx.pointer.buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let in_navigation = ctx
        .world
        .single(ctx.editor)
        .is_some_and(|state| state.current_mode == EditorMode::Navigation);
    if !in_navigation {
        return;
    }
    let Some(camera) = ctx.world.single(ctx.camera) else {
        return;
    };
    let ray = camera.picking_ray(
        ctx.pointer.position,
        ctx.config.fov_y_degrees,
        ctx.config.aspect_ratio,
    );
    match pick(&mut ctx.world, &ray, ctx.config.pick_phantoms_only) {
        Some((entity, distance)) => {
            log::debug!("pick hit {entity} at distance {distance:.2}");
            select(&mut ctx.world, ctx.editor, entity, ctx.time.elapsed_secs());
        }
        None => log::trace!("pick missed"),
    }
}

/// The nearest entity hit by `ray`, with its distance along the ray.
///
/// Spheres are placed with [`world_matrix`], so entities moved or created
/// since the last Transform phase are tested where they now are.
pub fn pick(world: &mut World, ray: &Ray, phantoms_only: bool) -> Option<(Entity, f32)> {
    let mut candidates: Vec<(Entity, BoundingSphere)> = Vec::new();
    if phantoms_only {
        world.query::<(&Transform, &BoundingSphere, &TextContent)>(|e, (_, bounds, _)| {
            candidates.push((e, *bounds))
        });
    } else {
        world.query::<(&Transform, &BoundingSphere)>(|e, (_, bounds)| {
            candidates.push((e, *bounds))
        });
    }

    let mut best: Option<(Entity, f32)> = None;
    for (entity, bounds) in candidates {
        let Some(matrix) = world_matrix(world, entity) else {
            continue;
        };
        let center = matrix.transform_point3(bounds.center_offset);
        let radius = bounds.radius * max_axis_scale(&matrix);
        if let Some(t) = ray_sphere(ray, center, radius) {
            if best.is_none_or(|(_, nearest)| t < nearest) {
                best = Some((entity, t));
            }
        }
    }
    best
}

/// Focus `entity`: deselect the previous focus and highlight the new one.
pub fn select(world: &mut World, editor: Handle<EditorState>, entity: Entity, now_secs: f32) {
    let Some(state) = world.single_mut(editor) else {
        return;
    };
    let previous = state.focused.replace(entity);
    let selection_id = state.take_selection_id();

    if let Some(previous) = previous.filter(|&p| p != entity) {
        deselect(world, previous);
    }
    world.set(
        entity,
        Selected {
            is_selected: true,
            selection_id,
            selection_time: now_secs,
        },
    );
    highlight(world, entity);
    log::info!("selected {entity} (#{selection_id})");
}

/// Clear the focus, if any.
pub fn clear_focus(world: &mut World, editor: Handle<EditorState>) {
    let Some(state) = world.single_mut(editor) else {
        return;
    };
    if let Some(previous) = state.focused.take() {
        deselect(world, previous);
    }
}

fn deselect(world: &mut World, entity: Entity) {
    if let Some(selected) = world.get_mut::<Selected>(entity) {
        selected.is_selected = false;
    }
    let Some(original) = world.get::<Highlight>(entity).copied() else {
        return;
    };
    if let Some(text) = world.get_mut::<TextContent>(entity) {
        text.color = original.color;
        text.billboard = original.billboard;
    }
    world.remove::<Highlight>(entity);
}

fn highlight(world: &mut World, entity: Entity) {
    if world.has::<Highlight>(entity) {
        return;
    }
    let Some(text) = world.get_mut::<TextContent>(entity) else {
        return;
    };
    let original = Highlight {
        color: text.color,
        billboard: text.billboard,
    };
    text.color = Color::YELLOW;
    text.billboard = true;
    world.set(entity, original);
}
