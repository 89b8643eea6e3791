//! # Component Kinds — A Closed Set of Typed Tables
//!
//! The store knows every component kind at compile time. The
//! `component_kinds!` invocation below generates:
//!
//! - [`ComponentKind`], one variant per kind (used in diagnostics and query
//!   validation),
//! - [`Components`], a struct with one [`Table`] field per kind,
//! - an [`impl Component`](Component) for each kind, telling the world where
//!   its table lives.
//!
//! Asking for a kind outside this list does not compile, which is how an
//! "unregistered component" is ruled out.

use std::fmt;

use super::entity::Entity;
use super::storage::Table;
use crate::camera::CameraController;
use crate::components::{
    BoundingSphere, EditorState, FileReference, Highlight, Name, NeedsReload, Position, Rotation,
    Scale, Selected, TextContent, Transform, Visible,
};

/// A kind of data that can be attached to an entity.
pub trait Component: Clone + Send + Sync + 'static {
    const KIND: ComponentKind;

    /// Writing this kind invalidates the entity's cached [`Transform`].
    const SPATIAL: bool = false;

    fn table(components: &Components) -> &Table<Self>;
    fn table_mut(components: &mut Components) -> &mut Table<Self>;
}

macro_rules! component_kinds {
    ($($ty:ident => $field:ident $(, spatial = $spatial:expr)?;)+) => {
        /// Every component kind the store can hold.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ComponentKind {
            $($ty,)+
        }

        /// One table per component kind.
        #[derive(Default)]
        pub struct Components {
            $(pub(crate) $field: Table<$ty>,)+
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;
                $(const SPATIAL: bool = $spatial;)?

                fn table(components: &Components) -> &Table<Self> {
                    &components.$field
                }

                fn table_mut(components: &mut Components) -> &mut Table<Self> {
                    &mut components.$field
                }
            }
        )+

        impl Components {
            /// Remove every component of `entity`, running cleanup hooks.
            pub(crate) fn release(&mut self, entity: Entity) -> usize {
                let mut released = 0;
                $(released += self.$field.remove_with_hook(entity) as usize;)+
                released
            }

            /// Copy every component of `from` onto `to`, replacing existing ones.
            pub(crate) fn copy_all(&mut self, from: Entity, to: Entity) {
                $(
                    if let Some(value) = self.$field.get(from).cloned() {
                        self.$field.insert(to, value);
                    }
                )+
            }

            /// Kinds currently attached to `entity`.
            pub(crate) fn kinds_of(&self, entity: Entity) -> Vec<ComponentKind> {
                let mut kinds = Vec::new();
                $(
                    if self.$field.contains(entity) {
                        kinds.push(ComponentKind::$ty);
                    }
                )+
                kinds
            }
        }
    };
}

component_kinds! {
    Position => position, spatial = true;
    Rotation => rotation, spatial = true;
    Scale => scale, spatial = true;
    Transform => transform;
    BoundingSphere => bounds;
    TextContent => text;
    FileReference => file_ref;
    Selected => selected;
    Highlight => highlight;
    Visible => visible;
    NeedsReload => needs_reload;
    Name => name;
    CameraController => camera;
    EditorState => editor_state;
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
