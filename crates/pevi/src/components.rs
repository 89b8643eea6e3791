//! # Components — The Data Attached to Phantoms
//!
//! Every kind here is plain data. The set is closed: each kind has its own
//! table in [`Components`](crate::ecs::component::Components), registered in
//! [`ecs::component`](crate::ecs::component).
//!
//! ## Spatial family
//!
//! [`Position`], [`Rotation`] and [`Scale`] are authored independently and
//! composed into a [`Transform`] on demand. Writing any of them through the
//! world marks the entity's `Transform` dirty.
//!
//! ## Fixed capacities
//!
//! Text and paths have a fixed byte capacity. Longer input is cut at the last
//! character boundary that fits; it is never rejected.

use std::path::Path;
use std::time::SystemTime;

use crate::ecs::Entity;
use crate::math::{Color, Mat4, Quat, Vec3};

/// Maximum bytes of text held by a [`TextContent`].
pub const TEXT_CAPACITY: usize = 255;

/// Maximum bytes of path held by a [`FileReference`].
pub const PATH_CAPACITY: usize = 511;

/// Cut `text` to at most `capacity` bytes without splitting a character.
pub fn truncate_to_capacity(text: &str, capacity: usize) -> &str {
    if text.len() <= capacity {
        return text;
    }
    let mut end = capacity;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

// ── Spatial ──────────────────────────────────────────────────────────────

/// Local translation relative to the parent (or the world for roots).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec3);

/// Local orientation as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation(pub Quat);

impl Default for Rotation {
    fn default() -> Self {
        Self(Quat::IDENTITY)
    }
}

/// Local per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(pub Vec3);

impl Default for Scale {
    fn default() -> Self {
        Self(Vec3::ONE)
    }
}

/// Cached local and world matrices.
///
/// Derived by the transform system, never authored. `world` is only valid
/// while `dirty` is clear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub local: Mat4,
    pub world: Mat4,
    pub dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            local: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            dirty: true,
        }
    }
}

impl Transform {
    /// World-space position of the local origin.
    pub fn world_position(&self) -> Vec3 {
        self.world.transform_point3(Vec3::ZERO)
    }
}

/// Sphere used by culling and picking, in the entity's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center_offset: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(radius: f32) -> Self {
        Self {
            center_offset: Vec3::ZERO,
            radius,
        }
    }
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::new(0.5)
    }
}

// ── Phantom data ─────────────────────────────────────────────────────────

/// A line of source rendered as a 3D label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    text: String,
    pub font_size: f32,
    pub color: Color,
    /// Always face the camera.
    pub billboard: bool,
}

impl TextContent {
    /// Create a label, truncating `text` to [`TEXT_CAPACITY`].
    pub fn new(text: &str) -> Self {
        Self {
            text: truncate_to_capacity(text, TEXT_CAPACITY).to_string(),
            font_size: 1.0,
            color: Color::WHITE,
            billboard: false,
        }
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, truncating to [`TEXT_CAPACITY`].
    pub fn set_text(&mut self, text: &str) {
        self.text = truncate_to_capacity(text, TEXT_CAPACITY).to_string();
    }
}

impl Default for TextContent {
    fn default() -> Self {
        Self::new("")
    }
}

/// Where a phantom came from.
///
/// `last_modified` never moves backwards; see [`FileReference::observe_modified`].
#[derive(Debug, Clone, PartialEq)]
pub struct FileReference {
    path: String,
    pub line_number: u32,
    last_modified: SystemTime,
}

impl FileReference {
    /// Create a reference, truncating the path to [`PATH_CAPACITY`].
    ///
    /// A truncated path no longer names the file, so hot reload never tags
    /// entities created from it. A warning is logged when that happens.
    pub fn new(path: &str, line_number: u32, last_modified: SystemTime) -> Self {
        if path.len() > PATH_CAPACITY {
            log::warn!(
                "path of {} bytes cut to {PATH_CAPACITY}; edits to it won't be picked up: {path}",
                path.len()
            );
        }
        Self {
            path: truncate_to_capacity(path, PATH_CAPACITY).to_string(),
            line_number,
            last_modified,
        }
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.path)
    }

    pub fn path_str(&self) -> &str {
        &self.path
    }

    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    /// Record a newer modification time. Older or equal times are ignored.
    ///
    /// Returns `true` if the stored time advanced.
    pub fn observe_modified(&mut self, modified: SystemTime) -> bool {
        if modified > self.last_modified {
            self.last_modified = modified;
            true
        } else {
            false
        }
    }
}

/// Selection state of a pickable entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Selected {
    pub is_selected: bool,
    /// Ordinal handed out by the editor state, increasing per selection.
    pub selection_id: u32,
    /// Elapsed seconds at the moment of selection.
    pub selection_time: f32,
}

/// Appearance a selected label had before it was highlighted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub color: Color,
    pub billboard: bool,
}

/// Human-readable entity name. Not unique.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ── Tags ─────────────────────────────────────────────────────────────────

/// Present while culling considers the entity visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visible;

/// Present once the backing file changed on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeedsReload;

// ── Editor state ─────────────────────────────────────────────────────────

/// Interaction mode of the editor. Tab cycles through them in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Navigation,
    Edit,
    Command,
}

impl EditorMode {
    pub fn next(self) -> Self {
        match self {
            EditorMode::Navigation => EditorMode::Edit,
            EditorMode::Edit => EditorMode::Command,
            EditorMode::Command => EditorMode::Navigation,
        }
    }
}

/// The editor singleton: mode and focus.
///
/// At most one entity is focused at a time; picking keeps `focused` and the
/// [`Selected`] flags consistent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditorState {
    pub current_mode: EditorMode,
    pub previous_mode: EditorMode,
    pub mode_transition: bool,
    pub focused: Option<Entity>,
    pub(crate) next_selection_id: u32,
}

impl EditorState {
    /// Switch to the next mode, remembering the previous one.
    pub fn cycle_mode(&mut self) {
        self.previous_mode = self.current_mode;
        self.current_mode = self.current_mode.next();
        self.mode_transition = true;
    }

    pub(crate) fn take_selection_id(&mut self) -> u32 {
        self.next_selection_id += 1;
        self.next_selection_id
    }
}
