//! # Pevi — Spatial Code Editor Runtime
//!
//! The runtime behind a 3D code-visualization editor: source files are
//! ingested into "phantom" entities, one per line, laid out in space and
//! driven through a phase-ordered frame pipeline
//! (Input → Transform → Culling → Render) by a small custom ECS. Edited
//! files are noticed and tagged for reload out of band.
//!
//! The crate never draws. Each frame ends with a
//! [`RenderQueue`](render::RenderQueue) of text draws for an external
//! renderer.
//!
//! Start with `use pevi::prelude::*` and drive an [`Editor`](editor::Editor).

pub mod camera;
pub mod components;
pub mod config;
pub mod context;
pub mod culling;
pub mod ecs;
pub mod editor;
pub mod hot_reload;
pub mod ingest;
pub mod input;
pub mod math;
pub mod picking;
pub mod prelude;
pub mod render;
pub mod time;
pub mod transform;
