//! Multiplicity accounting for derived sets.
//!
//! A non-injective map sends several upstream elements to the same output
//! element; a flat-map lets several upstream elements contribute the same
//! value. `Multiplicity` counts how many contributors currently justify each
//! output element, so an element disappears only when its last contributor
//! goes away.

use crate::delta::Delta;
use alloc::vec::Vec;
use core::hash::Hash;
use hashbrown::HashMap;

/// The effect of applying a weighted change to a `Multiplicity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The count went from zero to positive: the element entered the set.
    Appeared,
    /// The count went from positive to zero: the element left the set.
    Vanished,
    /// The element's presence did not change.
    Unchanged,
}

/// A counted set: element → number of contributors (always > 0).
#[derive(Clone, Debug)]
pub struct Multiplicity<T> {
    counts: HashMap<T, usize>,
}

impl<T> Default for Multiplicity<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Multiplicity<T>
where
    T: Eq + Hash,
{
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Returns the number of distinct present elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if no element is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns true if the element has at least one contributor.
    #[inline]
    pub fn contains(&self, data: &T) -> bool {
        self.counts.contains_key(data)
    }

    /// Returns the number of contributors for an element (0 if absent).
    #[inline]
    pub fn count(&self, data: &T) -> usize {
        self.counts.get(data).copied().unwrap_or(0)
    }

    /// Iterates over the present elements.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.counts.keys()
    }

    /// Iterates over present elements with their counts.
    pub fn iter_counts(&self) -> impl Iterator<Item = (&T, usize)> {
        self.counts.iter().map(|(k, c)| (k, *c))
    }

    /// Adds `diff` contributors to `data` (negative removes them).
    ///
    /// Removing more contributors than are present is a caller bug: debug
    /// builds panic, release builds clamp the count at zero.
    pub fn apply(&mut self, data: T, diff: i32) -> Transition {
        if diff == 0 {
            return Transition::Unchanged;
        }
        let before = self.count(&data);
        let after = before as i64 + diff as i64;
        debug_assert!(after >= 0, "multiplicity underflow: {} contributors removed from {}", -diff, before);
        let after = after.max(0) as usize;

        if after == 0 {
            self.counts.remove(&data);
        } else {
            self.counts.insert(data, after);
        }

        match (before, after) {
            (0, 0) => Transition::Unchanged,
            (0, _) => Transition::Appeared,
            (_, 0) => Transition::Vanished,
            _ => Transition::Unchanged,
        }
    }

    /// Adds one contributor.
    #[inline]
    pub fn increment(&mut self, data: T) -> Transition {
        self.apply(data, 1)
    }

    /// Removes one contributor.
    #[inline]
    pub fn decrement(&mut self, data: T) -> Transition {
        self.apply(data, -1)
    }

    /// Applies a batch and returns the presence changes as unit deltas
    /// (+1 appeared, -1 vanished), in batch order.
    pub fn apply_batch(&mut self, deltas: impl IntoIterator<Item = Delta<T>>) -> Vec<Delta<T>>
    where
        T: Clone,
    {
        let mut transitions = Vec::new();
        for delta in deltas {
            match self.apply(delta.data.clone(), delta.diff) {
                Transition::Appeared => transitions.push(Delta::insert(delta.data)),
                Transition::Vanished => transitions.push(Delta::delete(delta.data)),
                Transition::Unchanged => {}
            }
        }
        transitions
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
