//! The state passed to every system.
//!
//! [`Context`] bundles the ECS [`World`], the deferred [`Commands`] queue,
//! input state, frame timing and configuration into a single struct. Systems
//! receive `&mut Context`, giving them access to everything they need.
//!
//! The camera and the editor state are singleton entities. Instead of being
//! looked up by name, they are reached through typed handles created with
//! the context:
//!
//! ```ignore
//! fn report_focus(ctx: &mut Context) {
//!     if let Some(state) = ctx.world.single(ctx.editor) {
//!         log::info!("focused: {:?}", state.focused);
//!     }
//! }
//! ```

use crate::camera::CameraController;
use crate::components::{EditorState, Name};
use crate::config::EditorConfig;
use crate::ecs::{Commands, Entity, Handle, World};
use crate::input::{Input, KeyCode, PointerState};
use crate::render::RenderQueue;
use crate::time::Time;

/// Everything a system can touch.
pub struct Context {
    /// The entity/component store.
    pub world: World,
    /// Structural changes queued until the next phase boundary.
    pub commands: Commands,
    pub keys: Input<KeyCode>,
    pub pointer: PointerState,
    pub time: Time,
    pub config: EditorConfig,
    /// Text draws emitted by the Render phase for the external renderer.
    pub render_queue: RenderQueue,
    /// The camera singleton.
    pub camera: Handle<CameraController>,
    /// The editor-state singleton.
    pub editor: Handle<EditorState>,
}

impl Context {
    pub fn new(config: EditorConfig) -> Self {
        let mut world = World::new();
        let camera = world.create_singleton(CameraController::default());
        world.set(camera.entity(), Name::new("camera"));
        let editor = world.create_singleton(EditorState::default());
        world.set(editor.entity(), Name::new("editor"));

        Self {
            world,
            commands: Commands::new(),
            keys: Input::new(),
            pointer: PointerState::default(),
            time: Time::new(),
            config,
            render_queue: RenderQueue::default(),
            camera,
            editor,
        }
    }

    /// The entity currently focused by the editor, if any.
    pub fn focused(&self) -> Option<Entity> {
        self.world
            .single(self.editor)
            .and_then(|state| state.focused)
            .filter(|&entity| self.world.is_alive(entity))
    }

    /// A copy of the current camera state.
    pub fn camera_state(&self) -> CameraController {
        self.world.single(self.camera).copied().unwrap_or_default()
    }

    /// Clear the per-frame pointer and key edges.
    pub(crate) fn end_frame(&mut self) {
        self.pointer.end_frame();
        self.keys.clear_just();
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_reachable_by_handle() {
        let ctx = Context::default();
        assert_eq!(ctx.camera_state(), CameraController::default());
        assert_eq!(ctx.world.name(ctx.editor.entity()), Some("editor"));
        assert_eq!(ctx.focused(), None);
    }

    #[test]
    fn focus_on_destroyed_entity_reads_as_none() {
        let mut ctx = Context::default();
        let e = ctx.world.create();
        if let Some(state) = ctx.world.single_mut(ctx.editor) {
            state.focused = Some(e);
        }
        assert_eq!(ctx.focused(), Some(e));
        ctx.world.destroy(e);
        assert_eq!(ctx.focused(), None);
    }
}
