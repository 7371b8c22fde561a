//! Incremental map and flat-map operators.

use crate::delta::Delta;
use alloc::vec::Vec;

/// Applies a mapper function to a batch of deltas.
///
/// Each delta's element is transformed; the weights are preserved. Distinct
/// inputs may map to the same output, so callers maintaining a set fold the
/// result through a `Multiplicity`.
pub fn map_incremental<T, U, F>(input: &[Delta<T>], mapper: F) -> Vec<Delta<U>>
where
    F: Fn(&T) -> U,
{
    input
        .iter()
        .map(|d| Delta::new(mapper(&d.data), d.diff))
        .collect()
}

/// Expands each delta into one delta per element produced by `expander`.
///
/// Every produced element inherits the weight of its source delta.
pub fn flat_map_incremental<T, U, I, F>(input: &[Delta<T>], expander: F) -> Vec<Delta<U>>
where
    F: Fn(&T) -> I,
    I: IntoIterator<Item = U>,
{
    input
        .iter()
        .flat_map(|d| {
            let diff = d.diff;
            expander(&d.data).into_iter().map(move |u| Delta::new(u, diff))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec;

    #[test]
    fn test_map_incremental_basic() {
        let deltas = vec![Delta::insert(1), Delta::insert(2), Delta::delete(3)];

        let mapped = map_incremental(&deltas, |&x| x * 2);

        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped[0].data, 2);
        assert_eq!(mapped[1].data, 4);
        assert_eq!(mapped[2].data, 6);
    }

    #[test]
    fn test_map_incremental_preserves_diff() {
        let deltas = vec![Delta::insert(1i32), Delta::delete(2i32)];

        let mapped = map_incremental(&deltas, |&x| x.to_string());

        assert!(mapped[0].is_insert());
        assert!(mapped[1].is_delete());
    }

    #[test]
    fn test_flat_map_incremental() {
        let deltas = vec![Delta::insert("ab"), Delta::delete("c")];

        let expanded: Vec<Delta<String>> =
            flat_map_incremental(&deltas, |s| s.chars().map(|c| c.to_string()).collect::<Vec<_>>());

        assert_eq!(
            expanded,
            vec![
                Delta::insert("a".to_string()),
                Delta::insert("b".to_string()),
                Delta::delete("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_flat_map_incremental_empty_expansion() {
        let deltas = vec![Delta::insert(0usize), Delta::insert(2usize)];

        let expanded = flat_map_incremental(&deltas, |&n| 0..n);

        assert_eq!(expanded, vec![Delta::insert(0), Delta::insert(1)]);
    }
}
