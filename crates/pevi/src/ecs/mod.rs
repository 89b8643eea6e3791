//! # Entity Component Store
//!
//! A small ECS sized for the editor: a closed set of component kinds stored
//! in typed sparse tables, a parent/child hierarchy, typed relation edges,
//! prefabs, and a phase-ordered system schedule.
//!
//! ## Module Overview
//!
//! - [`entity`] — Generational entity IDs and typed singleton handles
//! - [`storage`] — `Table<T>`, one dense table per component kind
//! - [`component`] — The closed set of component kinds
//! - [`query`] — Closure-based iteration over entities holding several kinds
//! - [`world`] — Central container (entities + components + edges)
//! - [`hierarchy`] — Parent/child forest
//! - [`relation`] — Typed semantic edges and layered layout
//! - [`commands`] — Structural changes deferred to phase boundaries
//! - [`prefab`] — Templates and instantiation
//! - [`system`] — System trait, phases and the schedule runner

pub mod commands;
pub mod component;
pub mod entity;
pub mod hierarchy;
pub mod prefab;
pub mod query;
pub mod relation;
pub mod storage;
pub mod system;
pub mod world;

pub use commands::{Command, Commands};
pub use component::{Component, ComponentKind};
pub use entity::{Entity, Handle};
pub use hierarchy::HierarchyError;
pub use relation::{RelationKind, arrange_layered};
pub use system::{Phase, Schedule, ScheduleError, System};
#[cfg(feature = "diagnostics")]
pub use system::SystemTiming;
pub use world::World;
#[cfg(feature = "diagnostics")]
pub use world::WorldStats;
