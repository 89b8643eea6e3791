//! The editor runtime.
//!
//! [`Editor`] owns the [`Context`], the [`Schedule`] and the optional
//! [`FileWatcher`]. A host (windowed front end, headless driver, test) feeds
//! input into the context, calls [`Editor::frame`] once per frame, reads the
//! [`RenderQueue`] back out, and calls [`Editor::run_file_watch`] whenever it
//! has time to spare.
//!
//! # Example
//!
//! ```ignore
//! use pevi::prelude::*;
//!
//! let mut editor = Editor::new(EditorConfig::default());
//! editor.open_project("demo");
//! loop {
//!     editor.frame();
//!     for draw in editor.render_queue().draws() {
//!         // hand to the renderer
//!     }
//!     editor.run_file_watch();
//! }
//! ```
//!
//! Systems registered by [`Editor::new`]:
//!
//! | name         | phase     | after      |
//! |--------------|-----------|------------|
//! | `navigation` | Input     |            |
//! | `picking`    | Input     | navigation |
//! | `transform`  | Transform |            |
//! | `culling`    | Culling   |            |
//! | `render`     | Render    |            |
//! | `hot_reload` | FileWatch |            |

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::CameraController;
use crate::config::EditorConfig;
use crate::context::Context;
use crate::culling::culling_system;
use crate::ecs::{Entity, Phase, Schedule, World};
use crate::hot_reload::{FileWatcher, HotReloadSystem, check_paths};
use crate::ingest;
use crate::input::navigation_system;
use crate::math::Vec3;
use crate::picking::picking_system;
use crate::render::{RenderQueue, render_system};
use crate::transform::transform_system;

/// Files loaded by [`Editor::open_project`], with their start positions.
pub const PROJECT_FILES: [(&str, Vec3); 4] = [
    ("main.c", Vec3::new(0.0, 0.0, 0.0)),
    ("utils.c", Vec3::new(15.0, 0.0, 0.0)),
    ("components.h", Vec3::new(-15.0, 0.0, 0.0)),
    ("systems.c", Vec3::new(0.0, 0.0, 15.0)),
];

pub struct Editor {
    ctx: Context,
    schedule: Schedule,
    /// `None` when `watch_files` is off.
    watcher: Option<FileWatcher>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let watcher = config
            .watch_files
            .then(|| FileWatcher::new(config.debounce()));

        let mut schedule = Schedule::new();
        schedule.add_system("navigation", Phase::Input, navigation_system);
        schedule.add_system("picking", Phase::Input, picking_system);
        schedule.depends_on("picking", "navigation");
        schedule.add_system("transform", Phase::Transform, transform_system);
        schedule.add_system("culling", Phase::Culling, culling_system);
        schedule.add_system("render", Phase::Render, render_system);
        schedule.add_system("hot_reload", Phase::FileWatch, HotReloadSystem::new());
        log::info!("editor ready with {} systems", schedule.len());

        Self {
            ctx: Context::new(config),
            schedule,
            watcher,
        }
    }

    /// Ingest one file (see [`ingest::ingest_file`]) and watch it.
    pub fn ingest_file(&mut self, path: impl AsRef<Path>, start: Vec3) -> Entity {
        let path = path.as_ref();
        let root = ingest::ingest_file(&mut self.ctx.world, path, start, &self.ctx.config);
        if let Some(watcher) = &mut self.watcher {
            if path.exists() {
                watcher.watch(path);
            }
        }
        root
    }

    /// Ingest the [`PROJECT_FILES`] found in `dir`. Missing files become
    /// placeholders. Returns the roots in list order.
    pub fn open_project(&mut self, dir: impl AsRef<Path>) -> Vec<Entity> {
        let dir = dir.as_ref();
        log::info!("opening project '{}'", dir.display());
        PROJECT_FILES
            .iter()
            .map(|&(name, start)| {
                let path: PathBuf = dir.join(name);
                self.ingest_file(path, start)
            })
            .collect()
    }

    /// Run one frame, advancing time by the wall clock.
    pub fn frame(&mut self) {
        self.ctx.time.update();
        self.run_frame();
    }

    /// Run one frame with a fixed time step.
    pub fn frame_with(&mut self, delta: Duration) {
        self.ctx.time.advance(delta);
        self.run_frame();
    }

    fn run_frame(&mut self) {
        self.schedule.run_frame(&mut self.ctx);
        self.ctx.end_frame();
        #[cfg(feature = "diagnostics")]
        {
            let stats = self.ctx.world.take_frame_stats();
            if stats.created > 0 || stats.destroyed > 0 {
                log::trace!(
                    "frame {}: {} alive (+{} -{})",
                    self.ctx.time.frame_count(),
                    stats.alive,
                    stats.created,
                    stats.destroyed
                );
            }
        }
    }

    /// The out-of-band FileWatch pass: settle watcher events, then run the
    /// FileWatch phase.
    pub fn run_file_watch(&mut self) {
        if let Some(watcher) = &mut self.watcher {
            watcher.poll();
            let ready = watcher.drain_ready();
            if !ready.is_empty() {
                check_paths(&mut self.ctx.world, &ready);
            }
        }
        self.schedule.run_phase(Phase::FileWatch, &mut self.ctx);
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Mutable context, for feeding input and tweaking configuration.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn world(&self) -> &World {
        &self.ctx.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.ctx.world
    }

    pub fn camera_state(&self) -> CameraController {
        self.ctx.camera_state()
    }

    pub fn focused(&self) -> Option<Entity> {
        self.ctx.focused()
    }

    /// Draws emitted by the last frame's Render phase.
    pub fn render_queue(&self) -> &RenderQueue {
        &self.ctx.render_queue
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Register extra systems.
    pub fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }

    /// Whether a filesystem watcher is receiving events.
    pub fn is_watching(&self) -> bool {
        self.watcher.as_ref().is_some_and(FileWatcher::is_active)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::components::{FileReference, NeedsReload, TextContent, Visible};
    use crate::input::{KeyCode, MouseButton};
    use crate::math::{Color, Vec2};

    const STEP: Duration = Duration::from_millis(16);

    fn headless() -> Editor {
        Editor::new(EditorConfig {
            watch_files: false,
            ..EditorConfig::default()
        })
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn default_systems_are_ordered() {
        let editor = headless();
        assert_eq!(editor.schedule().phase_order(Phase::Input), vec!["navigation", "picking"]);
        assert_eq!(editor.schedule().phase_order(Phase::FileWatch), vec!["hot_reload"]);
        assert_eq!(editor.schedule().len(), 6);
    }

    #[test]
    fn frame_emits_draws_for_ingested_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "main.c", "int main() {\n    return 0;\n}\n");
        let mut editor = headless();
        let root = editor.ingest_file(&path, Vec3::ZERO);
        editor.frame_with(STEP);

        // Container title plus three lines.
        let draws = editor.render_queue().draws();
        assert_eq!(draws.len(), 4);
        let line = editor.world().children(root)[1];
        let draw = draws.iter().find(|d| d.entity == line);
        assert_eq!(draw.map(|d| d.text.as_str()), Some("    return 0;"));
        assert_eq!(draw.map(|d| d.position), Some(Vec3::new(0.0, -1.5, 0.0)));
    }

    #[test]
    fn far_files_are_culled() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "far.c", "x\n");
        let mut editor = headless();
        let root = editor.ingest_file(&path, Vec3::new(1000.0, 0.0, 0.0));
        editor.frame_with(STEP);
        assert!(!editor.world().has::<Visible>(root));
        assert!(editor.render_queue().is_empty());
    }

    #[test]
    fn open_project_spreads_files_and_keeps_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "main.c", "a\n");
        write_file(dir.path(), "utils.c", "b\n");
        let mut editor = headless();
        let roots = editor.open_project(dir.path());
        editor.frame_with(STEP);

        assert_eq!(roots.len(), 4);
        for (&root, &(_, start)) in roots.iter().zip(PROJECT_FILES.iter()) {
            let transform = editor.world().get::<crate::components::Transform>(root);
            assert_eq!(transform.map(|t| t.world_position()), Some(start));
        }
        assert!(editor.world().has::<FileReference>(roots[0]));
        let placeholder = editor.world().get::<TextContent>(roots[2]).cloned().unwrap_or_default();
        assert_eq!(placeholder.color, Color::RED);
        assert!(placeholder.text().starts_with("FILE NOT FOUND"));
    }

    #[test]
    fn click_focuses_a_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "click.c", "a\n");
        let mut editor = headless();
        let root = editor.ingest_file(&path, Vec3::ZERO);
        let line = editor.world().children(root)[0];
        editor.frame_with(STEP);

        let ctx = editor.context_mut();
        ctx.pointer.move_to(Vec2::new(0.5, 0.5), Vec2::ZERO);
        ctx.pointer.buttons.press(MouseButton::Left);
        editor.frame_with(STEP);

        // The title and the first line share the origin.
        let focused = editor.focused();
        assert!(focused == Some(root) || focused == Some(line));
    }

    #[test]
    fn tab_switches_mode_once_per_press() {
        let mut editor = headless();
        editor.context_mut().keys.press(KeyCode::Tab);
        editor.frame_with(STEP);
        editor.frame_with(STEP);
        let ctx = editor.context();
        let state = ctx.world.single(ctx.editor).copied().unwrap_or_default();
        assert_eq!(state.current_mode, crate::components::EditorMode::Edit);
        assert!(!state.mode_transition);
    }

    #[test]
    fn systems_spawn_through_commands() {
        let mut editor = headless();
        editor
            .schedule_mut()
            .add_system("spawner", Phase::Culling, |ctx: &mut Context| {
                if ctx.time.frame_count() == 1 {
                    ctx.commands.spawn(|world, e| {
                        world.set(e, TextContent::new("spawned"));
                    });
                }
            });
        let before = editor.world().entity_count();
        editor.frame_with(STEP);
        editor.frame_with(STEP);
        assert_eq!(editor.world().entity_count(), before + 1);
    }

    #[test]
    fn file_watch_tags_edited_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "edit.c", "a\n");
        let mut editor = headless();
        let root = editor.ingest_file(&path, Vec3::ZERO);

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(modified + Duration::from_secs(30)).unwrap();

        editor.frame_with(STEP);
        assert!(!editor.world().has::<NeedsReload>(root));
        editor.run_file_watch();
        assert!(editor.world().has::<NeedsReload>(root));
    }
}
