//! Subscriptions and their disposable `Connection` handles.
//!
//! A publisher keeps its subscribers in a `SubscriberList`, in subscription
//! order. Each subscriber shares an `active` flag with the `Connection`
//! returned to its owner, so disconnecting takes effect immediately, even for
//! a delivery that is already iterating over the list.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

/// Unique identifier for a subscription within one publisher.
pub type SubscriptionId = u64;

/// Callback type for change notifications.
pub type ChangeCallback<C> = Box<dyn FnMut(&C)>;

/// A registered observer callback.
pub(crate) struct Subscriber<C> {
    id: SubscriptionId,
    active: Rc<Cell<bool>>,
    callback: RefCell<ChangeCallback<C>>,
}

impl<C> Subscriber<C> {
    /// Invokes the callback unless the subscriber was disconnected.
    pub(crate) fn deliver(&self, change: &C) {
        if self.active.get() {
            (self.callback.borrow_mut())(change);
        }
    }
}

/// The subscribers of one publisher.
pub(crate) struct SubscriberList<C> {
    subscribers: Vec<Rc<Subscriber<C>>>,
    next_id: SubscriptionId,
}

impl<C> Default for SubscriberList<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SubscriberList<C> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a callback; returns its id and shared active flag.
    pub(crate) fn subscribe(&mut self, callback: ChangeCallback<C>) -> (SubscriptionId, Rc<Cell<bool>>) {
        let id = self.next_id;
        self.next_id += 1;

        let active = Rc::new(Cell::new(true));
        self.subscribers.push(Rc::new(Subscriber {
            id,
            active: active.clone(),
            callback: RefCell::new(callback),
        }));
        (id, active)
    }

    /// Removes a subscriber by id. Returns true if it was present.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Returns the subscribers to deliver the current change to.
    ///
    /// Subscribers added during the delivery do not see the change in flight.
    pub(crate) fn snapshot(&self) -> Vec<Rc<Subscriber<C>>> {
        self.subscribers.clone()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}

/// Removes a subscription from whatever list owns it.
pub(crate) trait Unsubscribe {
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

impl<C> Unsubscribe for RefCell<SubscriberList<C>> {
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.borrow_mut().remove(id)
    }
}

/// A live subscription.
///
/// Dropping the connection disconnects it. `disconnect` may be called at any
/// time, including from inside the subscription's own callback; once it
/// returns, the callback is never invoked again.
///
/// Disconnecting twice is a no-op: the second call returns `false`.
#[must_use = "dropping a Connection disconnects it"]
pub struct Connection {
    id: SubscriptionId,
    active: Rc<Cell<bool>>,
    registry: Weak<dyn Unsubscribe>,
}

impl Connection {
    pub(crate) fn new(id: SubscriptionId, active: Rc<Cell<bool>>, registry: Weak<dyn Unsubscribe>) -> Self {
        Self { id, active, registry }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns true until the connection is disconnected or its publisher
    /// is dropped.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.active.get() && self.registry.strong_count() > 0
    }

    /// Stops delivery to this subscription.
    ///
    /// Returns true if this call disconnected it, false if it was already
    /// disconnected.
    pub fn disconnect(&mut self) -> bool {
        if !self.active.replace(false) {
            return false;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
        tracing::trace!(id = self.id, "connection closed");
        true
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
