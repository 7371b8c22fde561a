//! Mutable observable sets.
//!
//! `SetVariable` owns its elements and mutates them in place. Each mutating
//! call computes the minimal `SetChange` it caused and publishes it; a call
//! with no net effect publishes nothing.

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

struct SetInner<T: Element> {
    value: RefCell<HashSet<T>>,
    publisher: Rc<Publisher<SetChange<T>>>,
}

/// A mutable observable set.
///
/// Cloning yields another handle to the same set.
pub struct SetVariable<T: Element> {
    inner: Rc<SetInner<T>>,
}

impl<T: Element> Clone for SetVariable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Element> SetVariable<T> {
    /// Creates an empty set.
    pub fn new(runtime: &Runtime) -> Self {
        Self::from_set(runtime, HashSet::new())
    }

    /// Creates a set with initial elements.
    pub fn from_set(runtime: &Runtime, value: HashSet<T>) -> Self {
        Self {
            inner: Rc::new(SetInner {
                value: RefCell::new(value),
                publisher: Publisher::new(runtime, 0),
            }),
        }
    }

    /// Creates a set from an iterator of elements.
    pub fn from_items(runtime: &Runtime, items: impl IntoIterator<Item = T>) -> Self {
        Self::from_set(runtime, items.into_iter().collect())
    }

    /// Inserts an element. Returns true if it was not present.
    pub fn insert(&self, item: T) -> bool {
        let inserted = self.inner.value.borrow_mut().insert(item.clone());
        if inserted {
            self.inner.publisher.publish(SetChange::insertion([item]));
        }
        inserted
    }

    /// Removes an element. Returns true if it was present.
    pub fn remove(&self, item: &T) -> bool {
        let removed = self.inner.value.borrow_mut().remove(item);
        if removed {
            self.inner.publisher.publish(SetChange::removal([item.clone()]));
        }
        removed
    }

    /// Inserts every element of `items`, as one change.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        let mut change = SetChange::new();
        {
            let mut value = self.inner.value.borrow_mut();
            for item in items {
                if value.insert(item.clone()) {
                    change.record_insert(item);
                }
            }
        }
        self.inner.publisher.publish(change);
    }

    /// Removes every element of `items`, as one change.
    pub fn subtract<'a>(&self, items: impl IntoIterator<Item = &'a T>) {
        let mut change = SetChange::new();
        {
            let mut value = self.inner.value.borrow_mut();
            for item in items {
                if value.remove(item) {
                    change.record_remove(item.clone());
                }
            }
        }
        self.inner.publisher.publish(change);
    }

    /// Keeps only the elements matching `keep`.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) {
        let mut change = SetChange::new();
        self.inner.value.borrow_mut().retain(|item| {
            let kept = keep(item);
            if !kept {
                change.record_remove(item.clone());
            }
            kept
        });
        self.inner.publisher.publish(change);
    }

    /// Removes every element.
    pub fn clear(&self) {
        let old = core::mem::take(&mut *self.inner.value.borrow_mut());
        self.inner.publisher.publish(SetChange::removal(old));
    }

    /// Replaces the whole value, publishing `(old − new, new − old)`.
    pub fn set(&self, value: HashSet<T>) {
        let change = {
            let mut current = self.inner.value.borrow_mut();
            let change = SetChange::between(&current, &value);
            *current = value;
            change
        };
        self.inner.publisher.publish(change);
    }

    /// Edits the value in place and publishes the resulting difference.
    pub fn modify<R>(&self, f: impl FnOnce(&mut HashSet<T>) -> R) -> R {
        let (result, change) = {
            let mut current = self.inner.value.borrow_mut();
            let before = current.clone();
            let result = f(&mut current);
            (result, SetChange::between(&before, &current))
        };
        self.inner.publisher.publish(change);
        result
    }
}

impl<T: Element> ObservableSet<T> for SetVariable<T> {
    #[inline]
    fn publisher(&self) -> &Rc<Publisher<SetChange<T>>> {
        &self.inner.publisher
    }

    fn with_value<R>(&self, f: impl FnOnce(&HashSet<T>) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    fn lease(&self) -> Lease {
        self.inner.clone()
    }
}

impl<T: Element> SetSource<T> for SetVariable<T> {
    fn settled(&self) -> HashSet<T> {
        self.settled_value()
    }

    fn node(&self) -> Rc<dyn Ranked> {
        self.inner.publisher.clone()
    }

    fn watch(&self, callback: Box<dyn FnMut(&SetChange<T>)>) -> Connection {
        self.inner.publisher.subscribe_boxed(callback)
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for SetVariable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SetVariable").field(&*self.inner.value.borrow()).finish()
    }
}
