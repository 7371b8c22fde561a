//! Observable ordered sequences.
//!
//! An `ArrayVariable` publishes the whole before/after sequence on every
//! edit. Seen as a `SetSource` it reports only changes to its value set, so
//! reordering or duplicating existing values is invisible to a flat-map.

use crate::change_set::{SetChange, ValueChange};
use crate::observable::SetSource;
use crate::publisher::{Publisher, Ranked};
use crate::runtime::Runtime;
use crate::subscription::Connection;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use cascade_core::{Element, Error, Result};
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;
use hashbrown::HashSet;

struct ArrayInner<T: Element> {
    items: RefCell<Vec<T>>,
    publisher: Rc<Publisher<ValueChange<Vec<T>>>>,
}

/// A mutable observable sequence.
///
/// Cloning yields another handle to the same sequence.
pub struct ArrayVariable<T: Element> {
    inner: Rc<ArrayInner<T>>,
}

impl<T: Element> Clone for ArrayVariable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Element> ArrayVariable<T> {
    /// Creates an empty sequence.
    pub fn new(runtime: &Runtime) -> Self {
        Self::with_items(runtime, Vec::new())
    }

    /// Creates a sequence with initial items.
    pub fn with_items(runtime: &Runtime, items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(ArrayInner {
                items: RefCell::new(items),
                publisher: Publisher::new(runtime, 0),
            }),
        }
    }

    /// Returns a copy of the items.
    pub fn get(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }

    /// Returns the item at `index`.
    pub fn nth(&self, index: usize) -> Option<T> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Runs `f` with the items.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.items.borrow())
    }

    /// Returns the number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Returns true if there are no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Returns true if some item equals `item`.
    pub fn contains(&self, item: &T) -> bool {
        self.inner.items.borrow().contains(item)
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        self.edit(|items| items.push(item));
    }

    /// Removes and returns the last item.
    pub fn pop(&self) -> Option<T> {
        self.edit(|items| items.pop())
    }

    /// Inserts an item at `index`, shifting later items.
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        self.try_edit(|items| {
            if index > items.len() {
                return Err(Error::index_out_of_bounds(index, items.len()));
            }
            items.insert(index, item);
            Ok(())
        })
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&self, index: usize) -> Result<T> {
        self.try_edit(|items| {
            if index >= items.len() {
                return Err(Error::index_out_of_bounds(index, items.len()));
            }
            Ok(items.remove(index))
        })
    }

    /// Replaces the item at `index`, returning the previous one.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        self.try_edit(|items| {
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or_else(|| Error::index_out_of_bounds(index, len))?;
            Ok(core::mem::replace(slot, item))
        })
    }

    /// Swaps two items.
    pub fn swap(&self, a: usize, b: usize) -> Result<()> {
        self.try_edit(|items| {
            let len = items.len();
            for index in [a, b] {
                if index >= len {
                    return Err(Error::index_out_of_bounds(index, len));
                }
            }
            items.swap(a, b);
            Ok(())
        })
    }

    /// Moves the item at `from` so it ends up at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> Result<()> {
        self.try_edit(|items| {
            let len = items.len();
            for index in [from, to] {
                if index >= len {
                    return Err(Error::index_out_of_bounds(index, len));
                }
            }
            let item = items.remove(from);
            items.insert(to, item);
            Ok(())
        })
    }

    /// Replaces every item.
    pub fn replace_all(&self, items: Vec<T>) {
        self.edit(|current| *current = items);
    }

    /// Sorts the items with a comparator.
    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.edit(|items| items.sort_by(compare));
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.edit(|items| items.clear());
    }

    /// Subscribes to sequence changes with the given callback.
    pub fn subscribe<F>(&self, callback: F) -> Connection
    where
        F: FnMut(&ValueChange<Vec<T>>) + 'static,
    {
        self.inner.publisher.subscribe(callback)
    }

    /// Returns the change stream.
    #[inline]
    pub fn publisher(&self) -> &Rc<Publisher<ValueChange<Vec<T>>>> {
        &self.inner.publisher
    }

    fn edit<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let (result, change) = {
            let mut items = self.inner.items.borrow_mut();
            let old = items.clone();
            let result = f(&mut items);
            (result, ValueChange::new(old, items.clone()))
        };
        self.inner.publisher.publish(change);
        result
    }

    fn try_edit<R>(&self, f: impl FnOnce(&mut Vec<T>) -> Result<R>) -> Result<R> {
        let (result, change) = {
            let mut items = self.inner.items.borrow_mut();
            let old = items.clone();
            let result = f(&mut items)?;
            (result, ValueChange::new(old, items.clone()))
        };
        self.inner.publisher.publish(change);
        Ok(result)
    }
}

impl<T: Element> SetSource<T> for ArrayVariable<T> {
    fn settled(&self) -> HashSet<T> {
        self.inner.publisher.with_pending(|pending| match pending {
            Some(change) => change.old.iter().cloned().collect(),
            None => self.inner.items.borrow().iter().cloned().collect(),
        })
    }

    fn node(&self) -> Rc<dyn Ranked> {
        self.inner.publisher.clone()
    }

    fn watch(&self, mut callback: Box<dyn FnMut(&SetChange<T>)>) -> Connection {
        self.inner.publisher.subscribe(move |change: &ValueChange<Vec<T>>| {
            let old: HashSet<T> = change.old.iter().cloned().collect();
            let new: HashSet<T> = change.new.iter().cloned().collect();
            let set_change = SetChange::between(&old, &new);
            if !set_change.is_empty() {
                callback(&set_change);
            }
        })
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for ArrayVariable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArrayVariable").field(&*self.inner.items.borrow()).finish()
    }
}
