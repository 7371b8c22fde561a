//! The observable-set query surface and the field capabilities.
//!
//! `ObservableSet` is implemented by `SetVariable` and by every derived
//! `SetView`; it carries the queries (`value`, `count`, `contains`,
//! `is_subset`, `is_superset`), `subscribe`, and the operator constructors.
//!
//! `SetSource` and `ValueSource` are the object-safe capabilities a derived
//! view needs from an element's observable field: the value its subscribers
//! were last told about, the graph node to rank against, and a change stream.

use crate::change_set::{SetChange, ValueChange};
use crate::field::{Field, Nested};
use crate::publisher::{Publisher, Ranked};
use crate::runtime::Runtime;
use crate::subscription::Connection;
use crate::views::{expand, relabel, SetView};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use cascade_core::Element;
use core::any::Any;
use hashbrown::HashSet;

/// Keeps an observable's internals alive on behalf of a dependent view.
///
/// A view holds a lease on its upstream, so intermediate views of a chain
/// such as `books.map(..).flat_map(..)` stay active while the last view does.
pub type Lease = Rc<dyn Any>;

/// A set-valued observable.
pub trait ObservableSet<T: Element> {
    /// Returns the change stream.
    fn publisher(&self) -> &Rc<Publisher<SetChange<T>>>;

    /// Runs `f` with the current value.
    fn with_value<R>(&self, f: impl FnOnce(&HashSet<T>) -> R) -> R;

    /// Returns a handle that keeps this observable's internals alive.
    fn lease(&self) -> Lease;

    /// Returns the runtime this observable schedules on.
    #[inline]
    fn runtime(&self) -> &Runtime {
        self.publisher().runtime()
    }

    /// Returns a copy of the current value.
    fn value(&self) -> HashSet<T> {
        self.with_value(|value| value.clone())
    }

    /// Returns the number of elements.
    fn count(&self) -> usize {
        self.with_value(|value| value.len())
    }

    /// Returns true if the set is empty.
    fn is_empty(&self) -> bool {
        self.with_value(|value| value.is_empty())
    }

    /// Returns true if the set contains `item`.
    fn contains(&self, item: &T) -> bool {
        self.with_value(|value| value.contains(item))
    }

    /// Returns true if every element is also in `other`.
    fn is_subset(&self, other: &HashSet<T>) -> bool {
        self.with_value(|value| value.is_subset(other))
    }

    /// Returns true if every element of `other` is in this set.
    fn is_superset(&self, other: &HashSet<T>) -> bool {
        self.with_value(|value| value.is_superset(other))
    }

    /// Returns the elements in ascending order.
    fn sorted(&self) -> Vec<T>
    where
        T: Ord,
    {
        let mut items: Vec<T> = self.with_value(|value| value.iter().cloned().collect());
        items.sort();
        items
    }

    /// Returns the value subscribers were last told about.
    ///
    /// Inside a transaction the current value may already include changes
    /// that have not been delivered; a new subscriber starts from this value
    /// and then receives those changes with the flush.
    fn settled_value(&self) -> HashSet<T> {
        let mut value = self.value();
        self.publisher().with_pending(|pending| {
            if let Some(change) = pending {
                change.revert(&mut value);
            }
        });
        value
    }

    /// Subscribes to changes with the given callback.
    fn subscribe<F>(&self, callback: F) -> Connection
    where
        F: FnMut(&SetChange<T>) + 'static,
        Self: Sized,
    {
        self.publisher().subscribe(callback)
    }

    /// Derives the image of this set under an injective transform.
    ///
    /// The transform must never map two distinct elements to the same value;
    /// debug builds panic when a collision is detected, release builds leave
    /// the view in an unspecified state.
    fn injective_map<U, F>(&self, transform: F) -> SetView<U>
    where
        Self: Sized,
        U: Element,
        F: Fn(&T) -> U + 'static,
    {
        relabel::injective_map(self, transform)
    }

    /// Derives the image of this set under a transform that may collide.
    ///
    /// An output element stays present while at least one source element
    /// maps to it.
    fn map<U, F>(&self, transform: F) -> SetView<U>
    where
        Self: Sized,
        U: Element,
        F: Fn(&T) -> U + 'static,
    {
        expand::expand(self, move |item: &T| Nested::single(transform(item)))
    }

    /// Like `map`, but the transform may return an observable field, which
    /// the view watches for every element currently in the set.
    fn map_field<U, F>(&self, transform: F) -> SetView<U>
    where
        Self: Sized,
        U: Element,
        F: Fn(&T) -> Field<U> + 'static,
    {
        expand::expand(self, move |item: &T| transform(item).into_nested())
    }

    /// Derives the union of the values each element contributes.
    ///
    /// Observable contributions (sets, arrays) are watched while their
    /// element is in the set; plain contributions are read once.
    fn flat_map<U, F>(&self, transform: F) -> SetView<U>
    where
        Self: Sized,
        U: Element,
        F: Fn(&T) -> Nested<U> + 'static,
    {
        expand::expand(self, transform)
    }

    /// Like `flat_map` with plain contributions only.
    ///
    /// Each element's values are read once, when the element enters the set.
    /// The result is only correct for values that do not change after being
    /// read; removing the element withdraws exactly what was read.
    fn flat_map_snapshot<U, I, F>(&self, transform: F) -> SetView<U>
    where
        Self: Sized,
        U: Element,
        I: IntoIterator<Item = U>,
        F: Fn(&T) -> I + 'static,
    {
        expand::expand(self, move |item: &T| Nested::plain(transform(item)))
    }
}

/// An observable collection of values, seen as a set.
///
/// Implemented by `SetVariable`, `SetView` and `ArrayVariable` (whose value
/// set ignores order and duplicates).
pub trait SetSource<T: Element> {
    /// Returns the value set subscribers were last told about.
    fn settled(&self) -> HashSet<T>;

    /// Returns the graph node behind this source.
    fn node(&self) -> Rc<dyn Ranked>;

    /// Subscribes to set changes.
    fn watch(&self, callback: Box<dyn FnMut(&SetChange<T>)>) -> Connection;
}

/// An observable scalar.
pub trait ValueSource<T> {
    /// Returns the value subscribers were last told about.
    fn settled(&self) -> T;

    /// Returns the graph node behind this source.
    fn node(&self) -> Rc<dyn Ranked>;

    /// Subscribes to value changes.
    fn watch(&self, callback: Box<dyn FnMut(&ValueChange<T>)>) -> Connection;
}
