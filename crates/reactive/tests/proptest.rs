//! Property-based tests for cascade-reactive using proptest.
//!
//! Random edit sequences drive a source set and a pool of nested sets; every
//! derived view must always equal a full recomputation from the sources, and
//! every delivered change must be non-empty, disjoint and replayable.

use cascade_reactive::{Connection, Element, Nested, ObservableSet, Runtime, SetChange, SetVariable};
use hashbrown::HashSet;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8),
    Remove(u8),
    Replace(Vec<u8>),
    Batch(Vec<(bool, u8)>),
    NestedInsert(usize, u8),
    NestedRemove(usize, u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..24).prop_map(Op::Insert),
        (0u8..24).prop_map(Op::Remove),
        prop::collection::vec(0u8..24, 0..8).prop_map(Op::Replace),
        prop::collection::vec((any::<bool>(), 0u8..24), 1..6).prop_map(Op::Batch),
        (0usize..3, 0u8..12).prop_map(|(i, x)| Op::NestedInsert(i, x)),
        (0usize..3, 0u8..12).prop_map(|(i, x)| Op::NestedRemove(i, x)),
    ]
}

/// Records a view's changes next to the value it started from.
struct Recorder<T: Element> {
    initial: HashSet<T>,
    log: Rc<RefCell<Vec<SetChange<T>>>>,
    _conn: Connection,
}

impl<T: Element> Recorder<T> {
    fn attach<S: ObservableSet<T>>(view: &S) -> Self {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let conn = view.subscribe(move |c: &SetChange<T>| sink.borrow_mut().push(c.clone()));
        Self {
            initial: view.value(),
            log,
            _conn: conn,
        }
    }

    /// Checks every recorded change and returns the replayed value.
    fn replay(&self) -> Result<HashSet<T>, TestCaseError> {
        let mut value = self.initial.clone();
        for change in self.log.borrow().iter() {
            prop_assert!(!change.is_empty(), "empty change delivered");
            prop_assert!(change.removed.is_disjoint(&change.inserted), "removed and inserted overlap");
            prop_assert!(change.removed.is_subset(&value), "removed element was not present");
            prop_assert!(change.inserted.is_disjoint(&value), "inserted element was already present");
            change.apply_to(&mut value);
        }
        Ok(value)
    }
}

fn apply(op: &Op, rt: &Runtime, source: &SetVariable<u8>, pool: &[SetVariable<u8>]) {
    match op {
        Op::Insert(x) => {
            source.insert(*x);
        }
        Op::Remove(x) => {
            source.remove(x);
        }
        Op::Replace(items) => source.set(items.iter().copied().collect()),
        Op::Batch(edits) => rt.transaction(|| {
            for (insert, x) in edits {
                if *insert {
                    source.insert(*x);
                } else {
                    source.remove(x);
                }
            }
        }),
        Op::NestedInsert(i, x) => {
            pool[*i].insert(*x);
        }
        Op::NestedRemove(i, x) => {
            pool[*i].remove(x);
        }
    }
}

proptest! {
    /// Test that every view equals a full recomputation after each edit.
    #[test]
    fn views_match_recomputation(
        initial in prop::collection::vec(0u8..24, 0..12),
        ops in prop::collection::vec(op_strategy(), 1..40)
    ) {
        let rt = Runtime::new();
        let source = SetVariable::from_items(&rt, initial);
        let pool: Vec<SetVariable<u8>> = (0..3u8)
            .map(|i| SetVariable::from_items(&rt, [i, i + 3]))
            .collect();
        let lookup = pool.clone();

        let thirds = source.map(|x: &u8| x / 3);
        let labels = source.injective_map(|x: &u8| u32::from(*x) * 7);
        let spread = source.flat_map_snapshot(|x: &u8| [x / 2, x / 2 + 1]);
        let nested = source.flat_map(move |x: &u8| Nested::observe(&lookup[usize::from(*x) % 3]));
        let folded = thirds.map(|t: &u8| t % 4);

        let recorders = (
            Recorder::attach(&thirds),
            Recorder::attach(&labels),
            Recorder::attach(&spread),
            Recorder::attach(&nested),
            Recorder::attach(&folded),
        );

        for op in &ops {
            apply(op, &rt, &source, &pool);

            let value = source.value();
            let expected_thirds: HashSet<u8> = value.iter().map(|x| x / 3).collect();
            let expected_labels: HashSet<u32> = value.iter().map(|x| u32::from(*x) * 7).collect();
            let expected_spread: HashSet<u8> = value.iter().flat_map(|x| [x / 2, x / 2 + 1]).collect();
            let expected_nested: HashSet<u8> = value
                .iter()
                .flat_map(|x| pool[usize::from(*x) % 3].value())
                .collect();
            let expected_folded: HashSet<u8> = expected_thirds.iter().map(|t| t % 4).collect();

            prop_assert_eq!(thirds.value(), expected_thirds);
            prop_assert_eq!(labels.value(), expected_labels);
            prop_assert_eq!(spread.value(), expected_spread);
            prop_assert_eq!(nested.value(), expected_nested);
            prop_assert_eq!(folded.value(), expected_folded);
        }

        prop_assert_eq!(recorders.0.replay()?, thirds.value());
        prop_assert_eq!(recorders.1.replay()?, labels.value());
        prop_assert_eq!(recorders.2.replay()?, spread.value());
        prop_assert_eq!(recorders.3.replay()?, nested.value());
        prop_assert_eq!(recorders.4.replay()?, folded.value());
    }

    /// Test that a transaction delivers at most one change per observer.
    #[test]
    fn transaction_delivers_at_most_once(
        initial in prop::collection::vec(0u8..16, 0..10),
        edits in prop::collection::vec((any::<bool>(), 0u8..16), 1..20)
    ) {
        let rt = Runtime::new();
        let source = SetVariable::from_items(&rt, initial);
        let before = source.value();
        let view = source.map(|x: &u8| x % 5);
        let recorder = Recorder::attach(&view);
        let source_recorder = Recorder::attach(&source);

        rt.transaction(|| {
            for (insert, x) in &edits {
                if *insert {
                    source.insert(*x);
                } else {
                    source.remove(x);
                }
            }
        });

        prop_assert!(recorder.log.borrow().len() <= 1);
        prop_assert!(source_recorder.log.borrow().len() <= 1);
        prop_assert_eq!(source_recorder.log.borrow().is_empty(), before == source.value());
        prop_assert_eq!(recorder.replay()?, view.value());
        prop_assert_eq!(source_recorder.replay()?, source.value());
    }
}
