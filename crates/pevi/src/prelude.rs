//! Convenience re-exports — `use pevi::prelude::*` for the common items.

// Core
pub use crate::camera::CameraController;
pub use crate::components::{
    BoundingSphere, EditorMode, EditorState, FileReference, Highlight, Name, NeedsReload,
    Position, Rotation, Scale, Selected, TextContent, Transform, Visible,
};
pub use crate::config::{ConfigError, EditorConfig};
pub use crate::context::Context;
pub use crate::ecs::{
    Commands, Component, Entity, Handle, HierarchyError, Phase, RelationKind, Schedule,
    ScheduleError, System, World, arrange_layered,
};
pub use crate::editor::Editor;
pub use crate::hot_reload::{FileWatcher, check_file_modifications};
pub use crate::ingest::ingest_file;
pub use crate::input::{Input, KeyCode, MouseButton, PointerState};
pub use crate::math::{Color, Mat4, Quat, Ray, Vec2, Vec3, Vec4};
pub use crate::picking::{clear_focus, pick, select};
pub use crate::render::{RenderQueue, TextDraw};
pub use crate::time::Time;

// Diagnostics (feature-gated)
#[cfg(feature = "diagnostics")]
pub use crate::ecs::{SystemTiming, WorldStats};
