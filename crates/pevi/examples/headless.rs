//! Headless editor run.
//!
//! Opens a project directory (default: the current directory), orbits the
//! camera for a few seconds of simulated frames, clicks the center of the
//! screen and keeps polling for file edits. Run with `RUST_LOG=debug` to see
//! the pipeline at work; edit one of the project files while it runs to see
//! it tagged for reload.
//!
//! ```text
//! cargo run --example headless -- path/to/project [config.json]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use pevi::prelude::*;

const STEP: Duration = Duration::from_millis(16);
const FRAMES: u32 = 600;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    let config = match args.next() {
        Some(path) => EditorConfig::load(&path).unwrap_or_else(|e| {
            log::warn!("{e}; using defaults");
            EditorConfig::default()
        }),
        None => EditorConfig::default(),
    };

    let mut editor = Editor::new(config);
    let roots = editor.open_project(&dir);
    log::info!("{} files, {} entities", roots.len(), editor.world().entity_count());

    for frame in 0..FRAMES {
        let ctx = editor.context_mut();
        match frame {
            // Slow orbit while the left button is held.
            0..=119 => {
                ctx.pointer.buttons.press(MouseButton::Left);
                ctx.pointer.move_to(Vec2::new(0.5, 0.5), Vec2::new(2.0, 0.0));
            }
            120 => ctx.pointer.buttons.release(MouseButton::Left),
            // Click the center.
            121 => ctx.pointer.buttons.press(MouseButton::Left),
            122 => ctx.pointer.buttons.release(MouseButton::Left),
            _ => {}
        }

        editor.frame_with(STEP);
        editor.run_file_watch();

        if frame % 120 == 0 {
            let camera = editor.camera_state();
            log::info!(
                "frame {frame}: {} draws, camera yaw {:.1} pitch {:.1}",
                editor.render_queue().len(),
                camera.yaw,
                camera.pitch
            );
            #[cfg(feature = "diagnostics")]
            for timing in editor.schedule().timings() {
                log::debug!("  {:<12} {:>8.1}us", timing.name, timing.duration_us);
            }
        }
        std::thread::sleep(STEP);
    }

    match editor.focused() {
        Some(entity) => {
            let text = editor.world().get::<TextContent>(entity).map(|t| t.text().to_string());
            log::info!("focused {entity}: {text:?}");
        }
        None => log::info!("nothing focused"),
    }
    let stale = editor.world().entities_with::<NeedsReload>().len();
    log::info!("{stale} entities need reload");
}
