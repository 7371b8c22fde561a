//! Per-element field access for derived views.
//!
//! A transform handed to `map_field` or `flat_map` reads a field of the
//! source element. The field is either a plain value, read once, or an
//! observable, watched for as long as the element stays in the source set.
//! The choice is made once per element, when the element enters the view.

use crate::change_set::{SetChange, ValueChange};
use crate::observable::{SetSource, ValueSource};
use crate::publisher::Ranked;
use crate::subscription::Connection;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use cascade_core::Element;
use core::fmt;
use hashbrown::HashSet;

/// A scalar field: a plain value or an observable one.
pub enum Field<T> {
    /// A value read once.
    Plain(T),
    /// A value watched for changes.
    Observable(Rc<dyn ValueSource<T>>),
}

impl<T: Element> Field<T> {
    /// Wraps a plain value.
    #[inline]
    pub fn plain(value: T) -> Self {
        Field::Plain(value)
    }

    /// Wraps an observable value.
    pub fn observe<S>(source: &S) -> Self
    where
        S: ValueSource<T> + Clone + 'static,
    {
        Field::Observable(Rc::new(source.clone()))
    }

    /// Returns true for the observable variant.
    #[inline]
    pub fn is_observable(&self) -> bool {
        matches!(self, Field::Observable(_))
    }

    /// Views the field as a one-element contribution.
    pub(crate) fn into_nested(self) -> Nested<T> {
        match self {
            Field::Plain(value) => Nested::single(value),
            Field::Observable(source) => Nested::Observable(Rc::new(SingleValue(source))),
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Plain(_) => f.write_str("Field::Plain"),
            Field::Observable(_) => f.write_str("Field::Observable"),
        }
    }
}

/// A collection-valued field: a plain snapshot or an observable collection.
pub enum Nested<T: Element> {
    /// Values read once, when the element enters the view.
    Plain(Vec<T>),
    /// A collection watched for changes.
    Observable(Rc<dyn SetSource<T>>),
}

impl<T: Element> Nested<T> {
    /// Snapshots the given values.
    pub fn plain(values: impl IntoIterator<Item = T>) -> Self {
        Nested::Plain(values.into_iter().collect())
    }

    /// A single plain value.
    #[inline]
    pub fn single(value: T) -> Self {
        Nested::Plain(vec![value])
    }

    /// Wraps an observable collection.
    pub fn observe<S>(source: &S) -> Self
    where
        S: SetSource<T> + Clone + 'static,
    {
        Nested::Observable(Rc::new(source.clone()))
    }

    /// Returns true for the observable variant.
    #[inline]
    pub fn is_observable(&self) -> bool {
        matches!(self, Nested::Observable(_))
    }
}

impl<T: Element> fmt::Debug for Nested<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nested::Plain(values) => write!(f, "Nested::Plain({} values)", values.len()),
            Nested::Observable(_) => f.write_str("Nested::Observable"),
        }
    }
}

/// An observable scalar seen as a set of exactly one value.
struct SingleValue<T>(Rc<dyn ValueSource<T>>);

impl<T: Element> SetSource<T> for SingleValue<T> {
    fn settled(&self) -> HashSet<T> {
        let mut value = HashSet::new();
        value.insert(self.0.settled());
        value
    }

    fn node(&self) -> Rc<dyn Ranked> {
        self.0.node()
    }

    fn watch(&self, mut callback: Box<dyn FnMut(&SetChange<T>)>) -> Connection {
        self.0.watch(Box::new(move |change: &ValueChange<T>| {
            let mut set_change = SetChange::new();
            set_change.record_remove(change.old.clone());
            set_change.record_insert(change.new.clone());
            if !set_change.is_empty() {
                callback(&set_change);
            }
        }))
    }
}
