//! # Ingestion — Source Files Become Phantoms
//!
//! [`ingest_file`] reads a file once and builds a small hierarchy:
//!
//! ```text
//! container  Name(path), FileReference(path, line 0), title label
//! ├── phantom  line 0   Position(0,  0.0, 0)
//! ├── phantom  line 2   Position(0, -1.5, 0)    (line 1 was blank)
//! └── ...
//! ```
//!
//! The container sits at the start position; phantom positions are local to
//! it, so the `i`-th phantom's world position is `start - (0, i * spacing, 0)`.
//! Blank lines get no phantom and leave no gap, but they still advance the
//! line number recorded in each [`FileReference`].
//!
//! A file that can't be read never fails ingestion: a single red placeholder
//! label naming the file takes the container's place.

use std::path::Path;
use std::time::SystemTime;

use crate::components::{
    BoundingSphere, FileReference, Name, Position, Rotation, Scale, TextContent, Transform,
    Visible,
};
use crate::config::EditorConfig;
use crate::ecs::{Entity, World};
use crate::math::{Color, Vec3};

/// Font size of a file container's title.
pub const TITLE_FONT_SIZE: f32 = 2.0;

/// Font size of a placeholder label.
pub const PLACEHOLDER_FONT_SIZE: f32 = 1.5;

/// Read `path` and create its container and phantoms. Returns the root entity:
/// the container, or the placeholder if the file couldn't be read.
pub fn ingest_file(
    world: &mut World,
    path: impl AsRef<Path>,
    start: Vec3,
    config: &EditorConfig,
) -> Entity {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("cannot ingest '{}': {err}", path.display());
            return placeholder(world, &path_str, start, &err);
        }
    };
    let modified = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let content = String::from_utf8_lossy(&bytes);

    let container = world.create();
    world.set(container, Name::new(path_str.as_ref()));
    spatial(world, container, start);
    world.set(container, FileReference::new(&path_str, 0, modified));
    let title = path
        .file_name()
        .map_or_else(|| path_str.to_string(), |name| name.to_string_lossy().into_owned());
    world.set(
        container,
        TextContent::new(&title)
            .with_font_size(TITLE_FONT_SIZE)
            .with_color(Color::BLUE),
    );
    world.set(container, BoundingSphere::new(config.phantom_radius));
    world.set(container, Visible);

    let mut phantoms = 0;
    for (line_number, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let phantom = world.create_child(container);
        let offset = Vec3::new(0.0, -(phantoms as f32) * config.line_spacing, 0.0);
        spatial(world, phantom, offset);
        world.set(phantom, TextContent::new(line));
        world.set(
            phantom,
            FileReference::new(&path_str, line_number as u32, modified),
        );
        world.set(phantom, BoundingSphere::new(config.phantom_radius));
        world.set(phantom, Visible);
        phantoms += 1;
    }
    log::info!("ingested {phantoms} lines from {}", path.display());
    container
}

/// Container-less placeholder for a file that couldn't be read.
fn placeholder(world: &mut World, path: &str, start: Vec3, err: &std::io::Error) -> Entity {
    let message = match err.kind() {
        std::io::ErrorKind::NotFound => format!("FILE NOT FOUND: {path}"),
        _ => format!("CANNOT READ {path}: {err}"),
    };
    let entity = world.create();
    world.set(entity, Name::new(path));
    spatial(world, entity, start);
    world.set(
        entity,
        TextContent::new(&message)
            .with_font_size(PLACEHOLDER_FONT_SIZE)
            .with_color(Color::RED),
    );
    world.set(entity, BoundingSphere::default());
    world.set(entity, Visible);
    entity
}

fn spatial(world: &mut World, entity: Entity, position: Vec3) {
    world.set(entity, Position(position));
    world.set(entity, Rotation::default());
    world.set(entity, Scale::default());
    world.set(entity, Transform::default());
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::transform::propagate_transforms;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn world_y(world: &World, e: Entity) -> f32 {
        world.get::<Transform>(e).map_or(f32::NAN, |t| t.world_position().y)
    }

    #[test]
    fn blank_lines_advance_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ab.c", "a\n\nb\n");
        let mut world = World::new();
        let root = ingest_file(&mut world, &path, Vec3::ZERO, &EditorConfig::default());
        propagate_transforms(&mut world);

        let phantoms = world.children(root).to_vec();
        assert_eq!(phantoms.len(), 2);
        let (a, b) = (phantoms[0], phantoms[1]);
        assert_eq!(world.get::<TextContent>(a).map(TextContent::text), Some("a"));
        assert_eq!(world.get::<TextContent>(b).map(TextContent::text), Some("b"));
        assert_eq!(world.get::<FileReference>(a).map(|f| f.line_number), Some(0));
        assert_eq!(world.get::<FileReference>(b).map(|f| f.line_number), Some(2));
        assert_eq!(world_y(&world, a), 0.0);
        assert_eq!(world_y(&world, b), -1.5);
        for e in [a, b] {
            assert!(world.has::<Visible>(e));
            assert_eq!(world.get::<BoundingSphere>(e), Some(&BoundingSphere::new(0.5)));
        }
    }

    #[test]
    fn three_lines_at_spacing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "abc.c", "a\nb\nc");
        let mut world = World::new();
        let root = ingest_file(&mut world, &path, Vec3::new(0.0, 10.0, 0.0), &EditorConfig::default());
        propagate_transforms(&mut world);

        let ys: Vec<f32> = world.children(root).iter().map(|&e| world_y(&world, e)).collect();
        assert_eq!(ys, vec![10.0, 8.5, 7.0]);
    }

    #[test]
    fn container_carries_file_reference_and_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "main.c", "int main() {}\n");
        let mut world = World::new();
        let root = ingest_file(&mut world, &path, Vec3::ZERO, &EditorConfig::default());

        let file = world.get::<FileReference>(root).cloned();
        assert_eq!(file.as_ref().map(|f| f.line_number), Some(0));
        assert_eq!(file.as_ref().map(|f| f.path()), Some(path.as_path()));
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        assert_eq!(file.map(|f| f.last_modified()), modified);

        let title = world.get::<TextContent>(root).cloned().unwrap_or_default();
        assert_eq!(title.text(), "main.c");
        assert_eq!(title.font_size, TITLE_FONT_SIZE);
        assert_eq!(title.color, Color::BLUE);
        assert_eq!(world.parent(root), None);
    }

    #[test]
    fn long_lines_are_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let long = "y".repeat(1000);
        let path = write_file(&dir, "long.c", &long);
        let mut world = World::new();
        let root = ingest_file(&mut world, &path, Vec3::ZERO, &EditorConfig::default());
        let line = world.children(root)[0];
        assert_eq!(
            world.get::<TextContent>(line).map(|t| t.text().len()),
            Some(crate::components::TEXT_CAPACITY)
        );
    }

    #[test]
    fn missing_file_becomes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.c");
        let mut world = World::new();
        let root = ingest_file(&mut world, &path, Vec3::ZERO, &EditorConfig::default());

        assert_eq!(world.entity_count(), 1);
        let text = world.get::<TextContent>(root).cloned().unwrap_or_default();
        assert!(text.text().contains(path.to_string_lossy().as_ref()));
        assert_eq!(text.color, Color::RED);
        assert!(world.children(root).is_empty());
        assert!(!world.has::<FileReference>(root));
    }

    #[test]
    fn crlf_lines_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "dos.c", "x;\r\n\r\ny;\r\n");
        let mut world = World::new();
        let root = ingest_file(&mut world, &path, Vec3::ZERO, &EditorConfig::default());
        let texts: Vec<String> = world
            .children(root)
            .iter()
            .filter_map(|&e| world.get::<TextContent>(e).map(|t| t.text().to_string()))
            .collect();
        assert_eq!(texts, vec!["x;", "y;"]);
    }
}
