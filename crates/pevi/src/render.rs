//! Render eligibility.
//!
//! The core never draws. Its Render phase answers one question for the
//! external renderer: which labels are on screen this frame, and where? The
//! answer is a [`RenderQueue`] of [`TextDraw`] items, one per entity with a
//! [`Transform`], a [`TextContent`] and the [`Visible`] tag.

use crate::components::{TextContent, Transform, Visible};
use crate::context::Context;
use crate::ecs::{Entity, World};
use crate::math::{Color, Vec3};

/// One label to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub entity: Entity,
    /// World-space anchor of the label.
    pub position: Vec3,
    pub text: String,
    pub font_size: f32,
    pub color: Color,
    pub billboard: bool,
}

/// Draw list rebuilt every frame by [`render_system`].
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    draws: Vec<TextDraw>,
}

impl RenderQueue {
    pub fn draws(&self) -> &[TextDraw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Rebuild the list from the store.
    pub fn collect(&mut self, world: &mut World) {
        self.draws.clear();
        world.query_filtered::<(&Transform, &TextContent), Visible>(|entity, (transform, text)| {
            self.draws.push(TextDraw {
                entity,
                position: transform.world_position(),
                text: text.text().to_string(),
                font_size: text.font_size,
                color: text.color,
                billboard: text.billboard,
            });
        });
    }
}

/// Render-phase system.
pub fn render_system(ctx: &mut Context) {
    ctx.render_queue.collect(&mut ctx.world);
}
