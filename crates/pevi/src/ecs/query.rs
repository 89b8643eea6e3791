//! # Query — Iterating Over Entities by Component Kind
//!
//! ```text
//! world.query::<(&mut Transform, &BoundingSphere)>(|entity, (transform, bounds)| {
//!     // ...
//! });
//!
//! 1. Take the Transform and BoundingSphere tables out of the store.
//! 2. Pick the shorter table's entity list as the candidate set.
//! 3. For each candidate holding both kinds, call the closure.
//! 4. Put the tables back.
//! ```
//!
//! ## Closure-Based Design
//!
//! Rust's `Iterator` can't express items that borrow from the iterator, so
//! queries take a closure. Taking the tables out of [`Components`] for the
//! duration of the query hands each parameter an owned table, which lets the
//! borrow checker see that `&mut A` and `&B` never alias. While the closure
//! runs the world itself is mutably borrowed, so no system can add or remove
//! entities under an in-flight iteration.
//!
//! The candidate list is copied before iteration starts, so the visiting
//! order is fixed for the whole query.

use super::component::{Component, ComponentKind, Components};
use super::entity::Entity;
use super::storage::Table;

/// Something a query can fetch per entity: `&T`, `&mut T`, or a tuple of them.
pub trait QueryParam {
    /// The item yielded per entity.
    type Item<'w>;

    /// Tables taken out of the store for the duration of the query.
    type Column;

    /// The kinds this parameter needs.
    fn kinds() -> Vec<ComponentKind>;

    /// Whether the query hands out mutable access to a spatial kind.
    fn writes_spatial() -> bool;

    fn extract(components: &mut Components) -> Self::Column;

    fn restore(col: Self::Column, components: &mut Components);

    /// The smallest entity list among the extracted tables.
    fn candidates(col: &Self::Column) -> &[Entity];

    /// Fetch the item for `entity`, or `None` if any kind is missing.
    fn fetch(col: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>>;
}

impl<T: Component> QueryParam for &T {
    type Item<'w> = &'w T;
    type Column = Table<T>;

    fn kinds() -> Vec<ComponentKind> {
        vec![T::KIND]
    }

    fn writes_spatial() -> bool {
        false
    }

    fn extract(components: &mut Components) -> Self::Column {
        std::mem::take(T::table_mut(components))
    }

    fn restore(col: Self::Column, components: &mut Components) {
        *T::table_mut(components) = col;
    }

    fn candidates(col: &Self::Column) -> &[Entity] {
        col.entities()
    }

    fn fetch(col: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
        col.get(entity)
    }
}

impl<T: Component> QueryParam for &mut T {
    type Item<'w> = &'w mut T;
    type Column = Table<T>;

    fn kinds() -> Vec<ComponentKind> {
        vec![T::KIND]
    }

    fn writes_spatial() -> bool {
        T::SPATIAL
    }

    fn extract(components: &mut Components) -> Self::Column {
        std::mem::take(T::table_mut(components))
    }

    fn restore(col: Self::Column, components: &mut Components) {
        *T::table_mut(components) = col;
    }

    fn candidates(col: &Self::Column) -> &[Entity] {
        col.entities()
    }

    fn fetch(col: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
        col.get_mut(entity)
    }
}

macro_rules! impl_query_param_tuple {
    ($($P:ident),+) => {
        impl<$($P: QueryParam),+> QueryParam for ($($P,)+) {
            type Item<'w> = ($($P::Item<'w>,)+);
            type Column = ($($P::Column,)+);

            fn kinds() -> Vec<ComponentKind> {
                let mut kinds = Vec::new();
                $(kinds.extend($P::kinds());)+
                kinds
            }

            fn writes_spatial() -> bool {
                false $(|| $P::writes_spatial())+
            }

            fn extract(components: &mut Components) -> Self::Column {
                ($($P::extract(components),)+)
            }

            #[allow(non_snake_case)]
            fn restore(col: Self::Column, components: &mut Components) {
                let ($($P,)+) = col;
                $($P::restore($P, components);)+
            }

            #[allow(non_snake_case)]
            fn candidates(col: &Self::Column) -> &[Entity] {
                let ($($P,)+) = col;
                let mut best: Option<&[Entity]> = None;
                $(
                    let list = $P::candidates($P);
                    if best.is_none_or(|b| list.len() < b.len()) {
                        best = Some(list);
                    }
                )+
                best.unwrap_or(&[])
            }

            #[allow(non_snake_case)]
            fn fetch(col: &mut Self::Column, entity: Entity) -> Option<Self::Item<'_>> {
                let ($($P,)+) = col;
                Some(($($P::fetch($P, entity)?,)+))
            }
        }
    };
}

impl_query_param_tuple!(A);
impl_query_param_tuple!(A, B);
impl_query_param_tuple!(A, B, C);
impl_query_param_tuple!(A, B, C, D);
impl_query_param_tuple!(A, B, C, D, E);
impl_query_param_tuple!(A, B, C, D, E, F);

/// Panic if a query names the same kind twice.
pub(crate) fn assert_distinct_kinds(kinds: &[ComponentKind]) {
    for (i, kind) in kinds.iter().enumerate() {
        assert!(
            !kinds[i + 1..].contains(kind),
            "query requests component kind `{kind}` more than once"
        );
    }
}
