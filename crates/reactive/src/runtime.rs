//! Transaction scopes and the flush scheduler.
//!
//! Every source is created against a `Runtime`, and every derived view
//! inherits its upstream's runtime. The runtime tracks how deeply transactions
//! are nested and owns the queue of publishers holding undelivered changes.
//! When the outermost transaction ends, the queue is drained in ascending
//! `(rank, schedule order)`: sources have rank 0 and a view always ranks above
//! everything it listens to, so a view has received all of its upstream
//! changes before its own coalesced change goes out.

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};
use core::fmt;

/// Default bound on deliveries within one flush.
pub const DEFAULT_MAX_FLUSH_STEPS: usize = 1_000_000;

/// Position of a scheduled publisher in the flush queue.
pub(crate) type QueueKey = (u32, u64);

/// Something the runtime can ask to deliver its pending change.
pub(crate) trait Flush {
    fn flush(&self);
}

/// Runtime configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of publisher flushes in one outermost transaction.
    ///
    /// Callbacks that keep mutating each other's sources would otherwise
    /// flush forever; exceeding the bound panics.
    pub max_flush_steps: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_flush_steps: DEFAULT_MAX_FLUSH_STEPS,
        }
    }
}

impl RuntimeConfig {
    /// Sets the flush step bound.
    pub fn with_max_flush_steps(mut self, steps: usize) -> Self {
        self.max_flush_steps = steps;
        self
    }
}

struct RuntimeInner {
    config: RuntimeConfig,
    depth: Cell<usize>,
    next_seq: Cell<u64>,
    queue: RefCell<BTreeMap<QueueKey, Weak<dyn Flush>>>,
}

/// The coordinating scheduler shared by a graph of observables.
///
/// Cloning a `Runtime` yields another handle to the same scheduler.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("depth", &self.inner.depth.get())
            .field("queued", &self.inner.queue.borrow().len())
            .finish()
    }
}

impl Runtime {
    /// Creates a runtime with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creates a runtime with the given configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                config,
                depth: Cell::new(0),
                next_seq: Cell::new(0),
                queue: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> RuntimeConfig {
        self.inner.config
    }

    /// Opens a transaction scope.
    ///
    /// Changes published while any scope is open are held back and merged
    /// per publisher; they are delivered when the outermost scope closes.
    pub fn begin(&self) -> Transaction {
        self.inner.depth.set(self.inner.depth.get() + 1);
        Transaction {
            runtime: self.clone(),
            open: true,
        }
    }

    /// Runs `f` inside a transaction scope.
    pub fn transaction<R>(&self, f: impl FnOnce() -> R) -> R {
        let tx = self.begin();
        let result = f();
        tx.commit();
        result
    }

    /// Returns true while a transaction scope (or a flush) is active.
    #[inline]
    pub fn in_transaction(&self) -> bool {
        self.inner.depth.get() > 0
    }

    /// Returns the current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.inner.depth.get()
    }

    /// Returns the number of publishers waiting to flush.
    pub fn queued(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Returns true if both handles refer to the same scheduler.
    #[inline]
    pub fn ptr_eq(&self, other: &Runtime) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn schedule(&self, rank: u32, target: Weak<dyn Flush>) -> QueueKey {
        let seq = self.inner.next_seq.get();
        self.inner.next_seq.set(seq + 1);
        let key = (rank, seq);
        self.inner.queue.borrow_mut().insert(key, target);
        tracing::trace!(rank, seq, "publisher scheduled");
        key
    }

    pub(crate) fn unschedule(&self, key: QueueKey) {
        self.inner.queue.borrow_mut().remove(&key);
    }

    fn end(&self) {
        let depth = self.inner.depth.get();
        debug_assert!(depth > 0, "transaction ended without being opened");
        if depth > 1 {
            self.inner.depth.set(depth - 1);
            return;
        }

        // The scope stays open while flushing so changes published by
        // callbacks join this flush instead of starting a nested one.
        let _reset = DepthReset(self);
        let steps = self.flush();
        if steps > 0 {
            tracing::debug!(steps, "transaction flushed");
        }
    }

    fn flush(&self) -> usize {
        let limit = self.inner.config.max_flush_steps;
        let mut steps = 0;
        loop {
            let next = self.inner.queue.borrow_mut().pop_first();
            let Some((_, target)) = next else { break };
            steps += 1;
            if steps > limit {
                panic!(
                    "flush exceeded {} steps; observers are feeding changes back into their sources",
                    limit
                );
            }
            if let Some(target) = target.upgrade() {
                target.flush();
            }
        }
        steps
    }
}

struct DepthReset<'a>(&'a Runtime);

impl Drop for DepthReset<'_> {
    fn drop(&mut self) {
        self.0.inner.depth.set(0);
    }
}

/// An open transaction scope.
///
/// Closing the outermost scope (by `commit` or by dropping the guard)
/// delivers every coalesced change.
#[must_use = "dropping a Transaction closes it immediately"]
pub struct Transaction {
    runtime: Runtime,
    open: bool,
}

impl Transaction {
    /// Returns the runtime this scope belongs to.
    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Closes the scope.
    pub fn commit(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.runtime.end();
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction").field("open", &self.open).finish()
    }
}
