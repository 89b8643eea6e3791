//! Keyboard and pointer input.
//!
//! The platform layer owns the window and feeds events in; the core only
//! consumes them. [`Input`] tracks which keys/buttons are currently pressed,
//! just pressed this frame, or just released this frame. [`PointerState`] adds
//! the pointer position, motion and wheel for the frame.
//!
//! [`navigation_system`] turns that state into camera motion and mode
//! switches:
//!
//! | Input | Effect (Navigation mode) |
//! |---|---|
//! | left drag | orbit around the target |
//! | right drag | pan the target |
//! | wheel | zoom |
//! | Tab (any mode) | cycle Navigation → Edit → Command |

use std::collections::HashSet;
use std::hash::Hash;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

use crate::components::EditorMode;
use crate::context::Context;
use crate::math::Vec2;

/// Tracks the state of a set of inputs (keys or mouse buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed this frame (not held last frame)
/// - `just_released`: released this frame
#[derive(Debug, Clone)]
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Returns `true` if the input was pressed this frame.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Returns `true` if the input was released this frame.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Call when an input is pressed (from the platform event handler).
    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    /// Call when an input is released (from the platform event handler).
    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Clear per-frame state. Called at the end of each frame.
    pub(crate) fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pointer state for one frame.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Position in the viewport, normalized: (0, 0) top-left, (1, 1) bottom-right.
    pub position: Vec2,
    /// Motion this frame, in pixels.
    pub delta: Vec2,
    /// Wheel motion this frame. Positive zooms in.
    pub wheel: f32,
    pub buttons: Input<MouseButton>,
}

impl PointerState {
    /// Record pointer motion to a new normalized position.
    pub fn move_to(&mut self, position: Vec2, delta_pixels: Vec2) {
        self.position = position;
        self.delta += delta_pixels;
    }

    pub fn scroll(&mut self, amount: f32) {
        self.wheel += amount;
    }

    /// Reset the per-frame motion, wheel and edge state.
    pub(crate) fn end_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.wheel = 0.0;
        self.buttons.clear_just();
    }
}

/// Input-phase system: mode switching and camera navigation.
pub fn navigation_system(ctx: &mut Context) {
    let Some(state) = ctx.world.single_mut(ctx.editor) else {
        return;
    };
    state.mode_transition = false;
    if ctx.keys.just_pressed(KeyCode::Tab) {
        state.cycle_mode();
        log::info!(
            "editor mode {:?} -> {:?}",
            state.previous_mode,
            state.current_mode
        );
    }
    if state.current_mode != EditorMode::Navigation {
        return;
    }

    let pointer = &ctx.pointer;
    let config = &ctx.config;
    let Some(camera) = ctx.world.single_mut(ctx.camera) else {
        return;
    };
    if pointer.delta != Vec2::ZERO {
        if pointer.buttons.pressed(MouseButton::Left) {
            camera.orbit(pointer.delta);
        } else if pointer.buttons.pressed(MouseButton::Right) {
            camera.pan(pointer.delta, config.pan_speed);
        }
    }
    if pointer.wheel != 0.0 {
        camera.zoom(pointer.wheel, config.zoom_step, config.zoom_min, config.zoom_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraController;
    use crate::components::EditorState;

    #[test]
    fn press_and_release_edges() {
        let mut keys = Input::new();
        keys.press(KeyCode::Tab);
        keys.press(KeyCode::Tab);
        assert!(keys.pressed(KeyCode::Tab));
        assert!(keys.just_pressed(KeyCode::Tab));
        keys.clear_just();
        assert!(!keys.just_pressed(KeyCode::Tab));
        keys.release(KeyCode::Tab);
        assert!(keys.just_released(KeyCode::Tab));
        assert!(!keys.pressed(KeyCode::Tab));
    }

    fn camera(ctx: &Context) -> CameraController {
        ctx.world.single(ctx.camera).copied().unwrap_or_default()
    }

    #[test]
    fn left_drag_orbits() {
        let mut ctx = Context::default();
        let before = camera(&ctx);
        ctx.pointer.buttons.press(MouseButton::Left);
        ctx.pointer.move_to(Vec2::new(0.5, 0.5), Vec2::new(10.0, 4.0));
        navigation_system(&mut ctx);
        let after = camera(&ctx);
        assert_eq!(after.yaw, before.yaw + 10.0 * before.rotation_speed);
        assert_eq!(after.pitch, before.pitch - 4.0 * before.rotation_speed);
    }

    #[test]
    fn right_drag_pans() {
        let mut ctx = Context::default();
        let before = camera(&ctx);
        ctx.pointer.buttons.press(MouseButton::Right);
        ctx.pointer.move_to(Vec2::new(0.5, 0.5), Vec2::new(50.0, 0.0));
        navigation_system(&mut ctx);
        let after = camera(&ctx);
        assert_ne!(after.target, before.target);
        assert_eq!(after.yaw, before.yaw);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut ctx = Context::default();
        ctx.pointer.scroll(1000.0);
        navigation_system(&mut ctx);
        assert_eq!(camera(&ctx).distance, ctx.config.zoom_min);
    }

    #[test]
    fn tab_cycles_mode_and_blocks_navigation() {
        let mut ctx = Context::default();
        ctx.keys.press(KeyCode::Tab);
        ctx.pointer.scroll(1.0);
        let before = camera(&ctx);
        navigation_system(&mut ctx);

        let state: EditorState = ctx.world.single(ctx.editor).copied().unwrap_or_default();
        assert_eq!(state.current_mode, EditorMode::Edit);
        assert_eq!(state.previous_mode, EditorMode::Navigation);
        assert!(state.mode_transition);
        assert_eq!(camera(&ctx).distance, before.distance);

        ctx.keys.clear_just();
        navigation_system(&mut ctx);
        let state: EditorState = ctx.world.single(ctx.editor).copied().unwrap_or_default();
        assert!(!state.mode_transition);
    }
}
