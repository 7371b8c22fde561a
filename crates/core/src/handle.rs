//! Identity handles for reference-like elements.
//!
//! A set of books keys on *which* book, not on what its fields currently
//! contain. Elements that carry mutable observable fields therefore derive
//! equality, hashing and ordering from a `Handle` issued at creation time.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Global handle counter used by `next_handle`.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

/// Gets the next process-wide unique handle.
pub fn next_handle() -> Handle {
    Handle(NEXT_HANDLE.fetch_add(1, Ordering::SeqCst))
}

/// An opaque identity key.
///
/// Two handles are equal only if they were issued by the same call. The
/// ordering follows issue order and exists for deterministic diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Returns the raw index of this handle.
    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues handles from a private counter.
///
/// Handles from two different allocators may compare equal, so a single
/// collection should draw its elements from one allocator (or from
/// `next_handle`).
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    /// Creates an allocator whose first handle has index 0.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Creates an allocator starting at the given index.
    pub fn starting_at(index: u64) -> Self {
        Self { next: index }
    }

    /// Issues a fresh handle.
    pub fn issue(&mut self) -> Handle {
        let handle = Handle(self.next);
        self.next += 1;
        handle
    }

    /// Returns the number of handles issued so far (relative to the start index).
    #[inline]
    pub fn peek(&self) -> u64 {
        self.next
    }
}
