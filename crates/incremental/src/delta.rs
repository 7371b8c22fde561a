//! Weighted element changes.
//!
//! A `Delta` pairs an element with a signed weight. A set edit that removes
//! `a` and inserts `b` is the batch `[(a, -1), (b, +1)]`; operators map and
//! expand such batches while carrying the weights through untouched.

use alloc::vec::Vec;
use core::hash::Hash;
use hashbrown::HashMap;

/// A weighted change to a single element.
///
/// The `diff` field is the weight of the change:
/// - `+1` means one more occurrence of `data`
/// - `-1` means one fewer occurrence of `data`
/// - Other values stand for several occurrences at once
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta<T> {
    /// The element being changed
    pub data: T,
    /// The weight: +1 for insert, -1 for delete
    pub diff: i32,
}

impl<T> Delta<T> {
    /// Creates a new delta with the given data and weight.
    #[inline]
    pub fn new(data: T, diff: i32) -> Self {
        Self { data, diff }
    }

    /// Creates an insertion delta (+1).
    #[inline]
    pub fn insert(data: T) -> Self {
        Self { data, diff: 1 }
    }

    /// Creates a deletion delta (-1).
    #[inline]
    pub fn delete(data: T) -> Self {
        Self { data, diff: -1 }
    }

    /// Returns true if this adds occurrences (diff > 0).
    #[inline]
    pub fn is_insert(&self) -> bool {
        self.diff > 0
    }

    /// Returns true if this removes occurrences (diff < 0).
    #[inline]
    pub fn is_delete(&self) -> bool {
        self.diff < 0
    }

    /// Returns true if this delta has no effect (diff == 0).
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.diff == 0
    }

    /// Maps the element, keeping the weight.
    #[inline]
    pub fn map<U, F>(self, f: F) -> Delta<U>
    where
        F: FnOnce(T) -> U,
    {
        Delta {
            data: f(self.data),
            diff: self.diff,
        }
    }

    /// Flips the sign of the weight.
    #[inline]
    pub fn negate(self) -> Self {
        Self {
            data: self.data,
            diff: -self.diff,
        }
    }
}

/// A batch of deltas produced by one upstream edit.
pub type DeltaBatch<T> = Vec<Delta<T>>;

/// Extension trait for working with delta batches.
pub trait DeltaBatchExt<T> {
    /// Filters out no-op deltas (diff == 0).
    fn compact(self) -> Self;

    /// Returns the net weight of the batch (sum of all diffs).
    fn net_count(&self) -> i64;

    /// Sums the weights per element and drops elements whose weights cancel.
    ///
    /// Output order follows the first occurrence of each element.
    fn consolidate(self) -> Self
    where
        T: Eq + Hash + Clone;
}

impl<T> DeltaBatchExt<T> for DeltaBatch<T> {
    fn compact(self) -> Self {
        self.into_iter().filter(|d| d.diff != 0).collect()
    }

    fn net_count(&self) -> i64 {
        self.iter().map(|d| d.diff as i64).sum()
    }

    fn consolidate(self) -> Self
    where
        T: Eq + Hash + Clone,
    {
        let mut order: Vec<T> = Vec::new();
        let mut weights: HashMap<T, i32> = HashMap::new();
        for delta in self {
            match weights.get_mut(&delta.data) {
                Some(weight) => *weight += delta.diff,
                None => {
                    order.push(delta.data.clone());
                    weights.insert(delta.data, delta.diff);
                }
            }
        }
        order
            .into_iter()
            .filter_map(|data| {
                let diff = weights.remove(&data)?;
                (diff != 0).then(|| Delta::new(data, diff))
            })
            .collect()
    }
}
