//! Publishers: the change stream behind every observable.
//!
//! A publisher never calls its subscribers directly from `publish`. It folds
//! the change into its pending change and schedules itself on the runtime;
//! the runtime flushes it once the outermost transaction closes. Two
//! publishes in one transaction therefore reach each subscriber as one merged
//! change, and a change that merges down to nothing is never delivered.

use crate::change_set::Change;
use crate::runtime::{Flush, QueueKey, Runtime};
use crate::subscription::{Connection, SubscriberList, Unsubscribe};
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// A node of the dependency graph, ordered by rank for flushing.
///
/// Sources have rank 0; a dependent always ranks strictly above every node
/// it listens to.
pub trait Ranked {
    /// Returns the current rank.
    fn rank(&self) -> u32;

    /// Raises the rank to at least `floor`, pushing dependents up with it.
    fn raise_rank(&self, floor: u32);

    /// Registers a node that must flush after this one.
    fn add_dependent(&self, dependent: Weak<dyn Ranked>);
}

/// Makes `downstream` flush after `upstream`.
pub(crate) fn link(upstream: &dyn Ranked, downstream: &Rc<dyn Ranked>) {
    downstream.raise_rank(upstream.rank() + 1);
    upstream.add_dependent(Rc::downgrade(downstream));
}

/// The change stream of one observable.
pub struct Publisher<C: Change> {
    runtime: Runtime,
    rank: Cell<u32>,
    subscribers: Rc<RefCell<SubscriberList<C>>>,
    pending: RefCell<Option<C>>,
    scheduled: Cell<Option<QueueKey>>,
    dependents: RefCell<Vec<Weak<dyn Ranked>>>,
    this: Weak<Publisher<C>>,
}

impl<C: Change> Publisher<C> {
    /// Creates a publisher with the given rank.
    pub fn new(runtime: &Runtime, rank: u32) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            runtime: runtime.clone(),
            rank: Cell::new(rank),
            subscribers: Rc::new(RefCell::new(SubscriberList::new())),
            pending: RefCell::new(None),
            scheduled: Cell::new(None),
            dependents: RefCell::new(Vec::new()),
            this: this.clone(),
        })
    }

    /// Returns the runtime this publisher schedules on.
    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Subscribes to changes with the given callback.
    pub fn subscribe<F>(&self, callback: F) -> Connection
    where
        F: FnMut(&C) + 'static,
    {
        self.subscribe_boxed(Box::new(callback))
    }

    /// Subscribes with an already boxed callback.
    pub fn subscribe_boxed(&self, callback: Box<dyn FnMut(&C)>) -> Connection {
        let (id, active) = self.subscribers.borrow_mut().subscribe(callback);
        let registry: Weak<dyn Unsubscribe> = Rc::downgrade(&self.subscribers) as Weak<RefCell<SubscriberList<C>>>;
        Connection::new(id, active, registry)
    }

    /// Returns the number of live subscriptions.
    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Publishes a change.
    ///
    /// Outside a transaction this opens one, so delivery still happens
    /// before `publish` returns.
    pub fn publish(&self, change: C) {
        if change.is_empty() {
            return;
        }
        let tx = self.runtime.begin();
        {
            let mut pending = self.pending.borrow_mut();
            match pending.as_mut() {
                Some(existing) => existing.merge(change),
                None => *pending = Some(change),
            }
        }
        if self.scheduled.get().is_none() {
            let key = self.runtime.schedule(self.rank.get(), self.this.clone());
            self.scheduled.set(Some(key));
        }
        tx.commit();
    }

    /// Runs `f` with the change accumulated since the last delivery.
    ///
    /// Observables use this to reconstruct the value their subscribers have
    /// last been told about.
    pub fn with_pending<R>(&self, f: impl FnOnce(Option<&C>) -> R) -> R {
        f(self.pending.borrow().as_ref())
    }

    /// Returns true if a change is waiting for the flush.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl<C: Change> Ranked for Publisher<C> {
    #[inline]
    fn rank(&self) -> u32 {
        self.rank.get()
    }

    fn raise_rank(&self, floor: u32) {
        if floor <= self.rank.get() {
            return;
        }
        self.rank.set(floor);
        if let Some(key) = self.scheduled.get() {
            self.runtime.unschedule(key);
            let key = self.runtime.schedule(floor, self.this.clone());
            self.scheduled.set(Some(key));
        }

        let dependents: Vec<Weak<dyn Ranked>> = {
            let mut dependents = self.dependents.borrow_mut();
            dependents.retain(|d| d.strong_count() > 0);
            dependents.clone()
        };
        for dependent in dependents {
            if let Some(dependent) = dependent.upgrade() {
                dependent.raise_rank(floor + 1);
            }
        }
    }

    fn add_dependent(&self, dependent: Weak<dyn Ranked>) {
        let mut dependents = self.dependents.borrow_mut();
        dependents.retain(|d| d.strong_count() > 0);
        if !dependents.iter().any(|d| Weak::ptr_eq(d, &dependent)) {
            dependents.push(dependent);
        }
    }
}

impl<C: Change> Flush for Publisher<C> {
    fn flush(&self) {
        self.scheduled.set(None);
        let Some(change) = self.pending.borrow_mut().take() else {
            return;
        };
        if change.is_empty() {
            tracing::trace!(rank = self.rank.get(), "pending change coalesced away");
            return;
        }
        let subscribers = self.subscribers.borrow().snapshot();
        for subscriber in subscribers {
            subscriber.deliver(&change);
        }
    }
}
