//! Prefabs and relations.
//!
//! Builds a "function card" prefab with two named slots, stamps one card per
//! function, links them with `References` edges, lays the call graph out in
//! layers and runs a frame to see what would be drawn.

use std::time::Duration;

use pevi::prelude::*;

fn main() {
    env_logger::init();

    let mut editor = Editor::new(EditorConfig {
        watch_files: false,
        ..EditorConfig::default()
    });
    let world = editor.world_mut();

    let card = world.create_prefab();
    world.set(card, Position(Vec3::ZERO));
    world.set(card, Rotation::default());
    world.set(card, Scale::default());
    world.set(card, Transform::default());
    world.set(card, BoundingSphere::new(1.0));
    world.set(card, Visible);

    let signature = world.create_prefab_slot(card, "signature");
    world.set(signature, Position(Vec3::new(0.0, 0.5, 0.0)));
    world.set(signature, Transform::default());
    world.set(signature, TextContent::new("fn ?").with_color(Color::BLUE));
    world.set(signature, Visible);

    let body = world.create_prefab_slot(card, "body");
    world.set(body, Position(Vec3::new(0.0, -0.5, 0.0)));
    world.set(body, Transform::default());
    world.set(body, TextContent::new("{ ... }"));
    world.set(body, Visible);

    let functions = ["main", "load_files", "parse_line", "spawn_phantom"];
    let mut cards = Vec::new();
    for name in functions {
        let Some(instance) = world.instantiate(card) else {
            continue;
        };
        world.set(instance, Name::new(name));
        if let Some(slot) = world.slot(instance, "signature") {
            if let Some(text) = world.get_mut::<TextContent>(slot) {
                text.set_text(&format!("fn {name}()"));
            }
        }
        cards.push(instance);
    }

    // main → load_files → {parse_line, spawn_phantom}
    world.relate(cards[0], RelationKind::References, cards[1]);
    world.relate(cards[1], RelationKind::References, cards[2]);
    world.relate(cards[1], RelationKind::References, cards[3]);
    let layers = arrange_layered(world, cards[0], RelationKind::References, 6.0);
    for (depth, layer) in layers.iter().enumerate() {
        let names: Vec<&str> = layer.iter().filter_map(|&e| world.name(e)).collect();
        log::info!("layer {depth}: {names:?}");
    }

    editor.frame_with(Duration::from_millis(16));
    for draw in editor.render_queue().draws() {
        log::info!(
            "{:<20} at ({:>5.1}, {:>5.1}, {:>5.1})",
            draw.text,
            draw.position.x,
            draw.position.y,
            draw.position.z
        );
    }
}
