//! The element bound for observable collections.

use core::hash::Hash;

/// A value that can live in an observable set.
///
/// Elements are compared with `Eq` and hashed with `Hash`; set semantics never
/// depend on ordering. Elements are cloned into change sets, so cheap clones
/// (handles, `Rc`s, small values) are preferred.
pub trait Element: Clone + Eq + Hash + 'static {}

impl<T> Element for T where T: Clone + Eq + Hash + 'static {}
