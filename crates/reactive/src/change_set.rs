//! Change descriptions delivered to observers.
//!
//! A `SetChange` is the minimal edit between two states of a set: the
//! elements that left and the elements that arrived. A `ValueChange` is the
//! old/new pair of a scalar or sequence observable.
//!
//! Both implement `Change`, which lets a publisher fold every change it
//! receives during one transaction into a single pending change.

use alloc::vec::Vec;
use cascade_core::Element;
use cascade_incremental::Delta;
use hashbrown::HashSet;

/// A change that can be coalesced with the change that follows it.
pub trait Change: 'static {
    /// Composes `later` onto `self`, so applying the result equals applying
    /// `self` and then `later`.
    fn merge(&mut self, later: Self);

    /// Returns true if the change has no observable effect.
    fn is_empty(&self) -> bool;
}

/// The difference between two states of a set.
///
/// Invariant: `removed` and `inserted` are disjoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetChange<T: Element> {
    /// Elements present before and absent after
    pub removed: HashSet<T>,
    /// Elements absent before and present after
    pub inserted: HashSet<T>,
}

impl<T: Element> Default for SetChange<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> SetChange<T> {
    /// Creates an empty change.
    #[inline]
    pub fn new() -> Self {
        Self {
            removed: HashSet::new(),
            inserted: HashSet::new(),
        }
    }

    /// Creates a change that only removes the given elements.
    pub fn removal(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            removed: items.into_iter().collect(),
            inserted: HashSet::new(),
        }
    }

    /// Creates a change that only inserts the given elements.
    pub fn insertion(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            removed: HashSet::new(),
            inserted: items.into_iter().collect(),
        }
    }

    /// Computes the minimal change turning `old` into `new`.
    pub fn between(old: &HashSet<T>, new: &HashSet<T>) -> Self {
        Self {
            removed: old.difference(new).cloned().collect(),
            inserted: new.difference(old).cloned().collect(),
        }
    }

    /// Builds a change from weighted deltas: positive weights insert,
    /// negative weights remove, and opposite edits of one element cancel.
    pub fn from_deltas(deltas: &[Delta<T>]) -> Self {
        let mut change = Self::new();
        for delta in deltas {
            if delta.is_insert() {
                change.record_insert(delta.data.clone());
            } else if delta.is_delete() {
                change.record_remove(delta.data.clone());
            }
        }
        change
    }

    /// Converts the change to unit deltas, removals first.
    pub fn to_deltas(&self) -> Vec<Delta<T>> {
        self.removed
            .iter()
            .cloned()
            .map(Delta::delete)
            .chain(self.inserted.iter().cloned().map(Delta::insert))
            .collect()
    }

    /// Returns true if nothing was removed or inserted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.inserted.is_empty()
    }

    /// Returns the number of edited elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.removed.len() + self.inserted.len()
    }

    /// Folds the insertion of `item` into this change.
    ///
    /// The caller guarantees `item` is absent from the state this change
    /// leads to; inserting back an element this change removed cancels out.
    pub fn record_insert(&mut self, item: T) {
        if !self.removed.remove(&item) {
            self.inserted.insert(item);
        }
    }

    /// Folds the removal of `item` into this change.
    ///
    /// The caller guarantees `item` is present in the state this change
    /// leads to; removing an element this change inserted cancels out.
    pub fn record_remove(&mut self, item: T) {
        if !self.inserted.remove(&item) {
            self.removed.insert(item);
        }
    }

    /// Applies the change to a set in place.
    pub fn apply_to(&self, set: &mut HashSet<T>) {
        for item in &self.removed {
            set.remove(item);
        }
        for item in &self.inserted {
            set.insert(item.clone());
        }
    }

    /// Undoes the change on a set in place.
    pub fn revert(&self, set: &mut HashSet<T>) {
        for item in &self.inserted {
            set.remove(item);
        }
        for item in &self.removed {
            set.insert(item.clone());
        }
    }

    /// Returns the removed elements in ascending order.
    pub fn sorted_removed(&self) -> Vec<T>
    where
        T: Ord,
    {
        sorted(&self.removed)
    }

    /// Returns the inserted elements in ascending order.
    pub fn sorted_inserted(&self) -> Vec<T>
    where
        T: Ord,
    {
        sorted(&self.inserted)
    }
}

impl<T: Element> Change for SetChange<T> {
    fn merge(&mut self, later: Self) {
        for item in later.removed {
            self.record_remove(item);
        }
        for item in later.inserted {
            self.record_insert(item);
        }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        SetChange::is_empty(self)
    }
}

fn sorted<T: Element + Ord>(items: &HashSet<T>) -> Vec<T> {
    let mut out: Vec<T> = items.iter().cloned().collect();
    out.sort();
    out
}

/// The replacement of a scalar or sequence value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueChange<T> {
    /// Value before the change
    pub old: T,
    /// Value after the change
    pub new: T,
}

impl<T> ValueChange<T> {
    /// Creates a value change.
    #[inline]
    pub fn new(old: T, new: T) -> Self {
        Self { old, new }
    }
}

impl<T: PartialEq + 'static> Change for ValueChange<T> {
    fn merge(&mut self, later: Self) {
        self.new = later.new;
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.old == self.new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn set(items: &[i32]) -> HashSet<i32> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_set_change_new() {
        let change: SetChange<i32> = SetChange::new();
        assert!(change.is_empty());
        assert_eq!(change.len(), 0);
    }

    #[test]
    fn test_set_change_between() {
        let change = SetChange::between(&set(&[0, 1, 2]), &set(&[1, 2, 3, 4]));
        assert_eq!(change.sorted_removed(), vec![0]);
        assert_eq!(change.sorted_inserted(), vec![3, 4]);
        assert!(change.removed.is_disjoint(&change.inserted));
    }

    #[test]
    fn test_set_change_between_equal_is_empty() {
        let change = SetChange::between(&set(&[5, 6]), &set(&[6, 5]));
        assert!(change.is_empty());
    }

    #[test]
    fn test_record_cancels_opposite_edit() {
        let mut change = SetChange::new();
        change.record_insert(1);
        change.record_remove(1);
        assert!(change.is_empty());

        change.record_remove(2);
        change.record_insert(2);
        assert!(change.is_empty());
    }

    #[test]
    fn test_merge_composes() {
        let start = set(&[1, 2, 3]);
        let first = SetChange::between(&start, &set(&[2, 3, 4]));
        let mut middle = start.clone();
        first.apply_to(&mut middle);
        let second = SetChange::between(&middle, &set(&[1, 3, 4, 5]));

        let mut merged = first.clone();
        merged.merge(second);

        let mut end = start.clone();
        merged.apply_to(&mut end);
        assert_eq!(end, set(&[1, 3, 4, 5]));
        // 1 was removed then re-inserted: no net edit.
        assert_eq!(merged.sorted_removed(), vec![2]);
        assert_eq!(merged.sorted_inserted(), vec![4, 5]);
    }

    #[test]
    fn test_apply_and_revert() {
        let change = SetChange::between(&set(&[1, 2]), &set(&[2, 3]));
        let mut value = set(&[1, 2]);
        change.apply_to(&mut value);
        assert_eq!(value, set(&[2, 3]));
        change.revert(&mut value);
        assert_eq!(value, set(&[1, 2]));
    }

    #[test]
    fn test_from_deltas() {
        let deltas = vec![
            Delta::insert(1),
            Delta::delete(2),
            Delta::insert(3),
            Delta::delete(3),
        ];
        let change = SetChange::from_deltas(&deltas);
        assert_eq!(change.sorted_inserted(), vec![1]);
        assert_eq!(change.sorted_removed(), vec![2]);
    }

    #[test]
    fn test_to_deltas_removals_first() {
        let change = SetChange {
            removed: set(&[7]),
            inserted: set(&[8]),
        };
        assert_eq!(change.to_deltas(), vec![Delta::delete(7), Delta::insert(8)]);
    }

    #[test]
    fn test_value_change_merge() {
        let mut change = ValueChange::new("a", "b");
        change.merge(ValueChange::new("b", "c"));
        assert_eq!(change, ValueChange::new("a", "c"));

        change.merge(ValueChange::new("c", "a"));
        assert!(Change::is_empty(&change));
    }
}
