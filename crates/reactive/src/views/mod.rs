//! Derived views.
//!
//! Every operator returns a `SetView`: a read-only observable set whose value
//! is cached and kept in sync with its upstream incrementally. The view owns
//! the operator's driver (the per-element bookkeeping plus the upstream and
//! per-element connections); dropping the last handle releases all of them.
//!
//! - `relabel`: `injective_map`, a pure relabeling of each change
//! - `expand`: `map`, `map_field`, `flat_map`, `flat_map_snapshot`, all
//!   maintained through one multiplicity table per view

pub(crate) mod expand;
pub(crate) mod relabel;

use crate::change_set::SetChange;
use crate::observable::{Lease, ObservableSet, SetSource};
use crate::publisher::{Publisher, Ranked};
use crate::runtime::Runtime;
use crate::subscription::Connection;
use alloc::boxed::Box;
use alloc::rc::Rc;
use cascade_core::Element;
use core::cell::RefCell;
use core::fmt;
use hashbrown::HashSet;

/// The cached value and change stream of a derived view.
pub(crate) struct ViewCache<U: Element> {
    value: RefCell<HashSet<U>>,
    publisher: Rc<Publisher<SetChange<U>>>,
}

impl<U: Element> ViewCache<U> {
    /// Creates an empty cache ranked above `upstream`.
    pub(crate) fn new(runtime: &Runtime, upstream: &dyn Ranked) -> Rc<Self> {
        let cache = Rc::new(Self {
            value: RefCell::new(HashSet::new()),
            publisher: Publisher::new(runtime, 0),
        });
        cache.follow(upstream);
        cache
    }

    /// Orders this view's flush after `upstream`.
    pub(crate) fn follow(&self, upstream: &dyn Ranked) {
        let node: Rc<dyn Ranked> = self.publisher.clone();
        crate::publisher::link(upstream, &node);
    }

    /// Applies a change to the cached value without publishing it.
    pub(crate) fn seed(&self, change: &SetChange<U>) {
        change.apply_to(&mut self.value.borrow_mut());
    }

    /// Applies a change to the cached value and publishes it.
    pub(crate) fn commit(&self, change: SetChange<U>) {
        if change.is_empty() {
            return;
        }
        change.apply_to(&mut self.value.borrow_mut());
        self.publisher.publish(change);
    }

    pub(crate) fn contains(&self, item: &U) -> bool {
        self.value.borrow().contains(item)
    }
}

/// A derived, read-only observable set.
///
/// Cloning yields another handle to the same view.
pub struct SetView<U: Element> {
    cache: Rc<ViewCache<U>>,
    driver: Lease,
}

impl<U: Element> Clone for SetView<U> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            driver: self.driver.clone(),
        }
    }
}

impl<U: Element> SetView<U> {
    pub(crate) fn new(cache: Rc<ViewCache<U>>, driver: Lease) -> Self {
        Self { cache, driver }
    }
}

impl<U: Element> ObservableSet<U> for SetView<U> {
    #[inline]
    fn publisher(&self) -> &Rc<Publisher<SetChange<U>>> {
        &self.cache.publisher
    }

    fn with_value<R>(&self, f: impl FnOnce(&HashSet<U>) -> R) -> R {
        f(&self.cache.value.borrow())
    }

    fn lease(&self) -> Lease {
        self.driver.clone()
    }
}

impl<U: Element> SetSource<U> for SetView<U> {
    fn settled(&self) -> HashSet<U> {
        self.settled_value()
    }

    fn node(&self) -> Rc<dyn Ranked> {
        self.cache.publisher.clone()
    }

    fn watch(&self, callback: Box<dyn FnMut(&SetChange<U>)>) -> Connection {
        self.cache.publisher.subscribe_boxed(callback)
    }
}

impl<U: Element + fmt::Debug> fmt::Debug for SetView<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SetView").field(&*self.cache.value.borrow()).finish()
    }
}
