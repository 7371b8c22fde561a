//! Observable scalar values.
//!
//! A `Variable` holds one value, such as the title of a book, and publishes a
//! `ValueChange` when it is replaced by a different value.

use crate::change_set::ValueChange;
use crate::field::Field;
use crate::observable::ValueSource;
use crate::publisher::{Publisher, Ranked};
use crate::runtime::Runtime;
use crate::subscription::Connection;
use alloc::boxed::Box;
use alloc::rc::Rc;
use cascade_core::Element;
use core::cell::RefCell;
use core::fmt;

struct VariableInner<T: PartialEq + 'static> {
    value: RefCell<T>,
    publisher: Rc<Publisher<ValueChange<T>>>,
}

/// A mutable observable value.
///
/// Cloning yields another handle to the same value.
pub struct Variable<T: PartialEq + 'static> {
    inner: Rc<VariableInner<T>>,
}

impl<T: PartialEq + 'static> Clone for Variable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Variable<T>
where
    T: Clone + PartialEq + 'static,
{
    /// Creates a variable holding `value`.
    pub fn new(runtime: &Runtime, value: T) -> Self {
        Self {
            inner: Rc::new(VariableInner {
                value: RefCell::new(value),
                publisher: Publisher::new(runtime, 0),
            }),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Runs `f` with the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replaces the value. Returns false (and publishes nothing) if the new
    /// value equals the current one.
    pub fn set(&self, value: T) -> bool {
        let old = {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return false;
            }
            core::mem::replace(&mut *current, value.clone())
        };
        self.inner.publisher.publish(ValueChange::new(old, value));
        true
    }

    /// Replaces the value and returns the previous one.
    pub fn replace(&self, value: T) -> T {
        let old = self.get();
        self.set(value);
        old
    }

    /// Edits the value in place; publishes if the result differs.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut value = self.get();
        f(&mut value);
        self.set(value)
    }

    /// Subscribes to changes with the given callback.
    pub fn subscribe<F>(&self, callback: F) -> Connection
    where
        F: FnMut(&ValueChange<T>) + 'static,
    {
        self.inner.publisher.subscribe(callback)
    }

    /// Returns the change stream.
    #[inline]
    pub fn publisher(&self) -> &Rc<Publisher<ValueChange<T>>> {
        &self.inner.publisher
    }

    /// Wraps this variable as an observable field.
    pub fn field(&self) -> Field<T>
    where
        T: Element,
    {
        Field::observe(self)
    }

    /// Returns true if both handles refer to the same variable.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> ValueSource<T> for Variable<T>
where
    T: Clone + PartialEq + 'static,
{
    fn settled(&self) -> T {
        self.inner
            .publisher
            .with_pending(|pending| pending.map(|change| change.old.clone()))
            .unwrap_or_else(|| self.get())
    }

    fn node(&self) -> Rc<dyn Ranked> {
        self.inner.publisher.clone()
    }

    fn watch(&self, callback: Box<dyn FnMut(&ValueChange<T>)>) -> Connection {
        self.inner.publisher.subscribe_boxed(callback)
    }
}

impl<T> fmt::Debug for Variable<T>
where
    T: fmt::Debug + PartialEq + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&*self.inner.value.borrow()).finish()
    }
}
