//! The expansion driver behind `map`, `map_field`, `flat_map` and
//! `flat_map_snapshot`.
//!
//! Every source element contributes a set of output values, either a
//! snapshot read once or an observable collection watched while the element
//! is present. Contributions from all elements are counted in one
//! `Multiplicity` table; only `Appeared` and `Vanished` transitions reach the
//! view's subscribers.

use super::{SetView, ViewCache};
use crate::change_set::SetChange;
use crate::field::Nested;
use crate::observable::{Lease, ObservableSet, SetSource};
use crate::subscription::Connection;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use cascade_core::Element;
use cascade_incremental::{Multiplicity, Transition};
use core::cell::RefCell;
use hashbrown::{HashMap, HashSet};

/// What one source element currently contributes.
struct Contribution<U: Element> {
    values: HashSet<U>,
    // Both dropped together when the element leaves the source set.
    _watch: Option<Connection>,
    _source: Option<Rc<dyn SetSource<U>>>,
}

struct ExpandState<T: Element, U: Element> {
    counts: Multiplicity<U>,
    contributions: HashMap<T, Contribution<U>>,
}

struct ExpandDriver<T: Element, U: Element> {
    cache: Rc<ViewCache<U>>,
    transform: Box<dyn Fn(&T) -> Nested<U>>,
    state: RefCell<ExpandState<T, U>>,
    upstream: RefCell<Option<Connection>>,
    this: Weak<ExpandDriver<T, U>>,
    _lease: Lease,
}

impl<T: Element, U: Element> ExpandDriver<T, U> {
    fn on_upstream(&self, change: &SetChange<T>) {
        let mut out = SetChange::new();
        for item in &change.removed {
            self.detach(item, &mut out);
        }
        for item in &change.inserted {
            self.attach(item.clone(), &mut out);
        }
        self.cache.commit(out);
    }

    fn on_nested(&self, key: &T, change: &SetChange<U>) {
        let mut out = SetChange::new();
        {
            let mut state = self.state.borrow_mut();
            let ExpandState { counts, contributions } = &mut *state;
            let Some(contribution) = contributions.get_mut(key) else {
                return;
            };
            for value in &change.removed {
                if contribution.values.remove(value) && counts.decrement(value.clone()) == Transition::Vanished {
                    out.record_remove(value.clone());
                }
            }
            for value in &change.inserted {
                if contribution.values.insert(value.clone())
                    && counts.increment(value.clone()) == Transition::Appeared
                {
                    out.record_insert(value.clone());
                }
            }
        }
        self.cache.commit(out);
    }

    /// Starts tracking a source element, folding its values into `out`.
    fn attach(&self, item: T, out: &mut SetChange<U>) {
        if self.state.borrow().contributions.contains_key(&item) {
            return;
        }

        let contribution = match (self.transform)(&item) {
            Nested::Plain(values) => Contribution {
                values: values.into_iter().collect(),
                _watch: None,
                _source: None,
            },
            Nested::Observable(source) => {
                self.cache.follow(&*source.node());
                let values = source.settled();
                let this = self.this.clone();
                let key = item.clone();
                let watch = source.watch(Box::new(move |change: &SetChange<U>| {
                    if let Some(driver) = this.upgrade() {
                        driver.on_nested(&key, change);
                    }
                }));
                Contribution {
                    values,
                    _watch: Some(watch),
                    _source: Some(source),
                }
            }
        };

        let mut state = self.state.borrow_mut();
        for value in &contribution.values {
            if state.counts.increment(value.clone()) == Transition::Appeared {
                out.record_insert(value.clone());
            }
        }
        state.contributions.insert(item, contribution);
    }

    /// Stops tracking a source element, withdrawing what it contributed.
    fn detach(&self, item: &T, out: &mut SetChange<U>) {
        let removed = {
            let mut state = self.state.borrow_mut();
            let ExpandState { counts, contributions } = &mut *state;
            let Some(contribution) = contributions.remove(item) else {
                return;
            };
            for value in &contribution.values {
                if counts.decrement(value.clone()) == Transition::Vanished {
                    out.record_remove(value.clone());
                }
            }
            contribution
        };
        // Disconnects the nested watch outside the state borrow.
        drop(removed);
    }
}

pub(crate) fn expand<T, U, S, F>(source: &S, transform: F) -> SetView<U>
where
    T: Element,
    U: Element,
    S: ObservableSet<T>,
    F: Fn(&T) -> Nested<U> + 'static,
{
    let cache = ViewCache::new(source.runtime(), &**source.publisher());
    let driver = Rc::new_cyclic(|this| ExpandDriver {
        cache: cache.clone(),
        transform: Box::new(transform),
        state: RefCell::new(ExpandState {
            counts: Multiplicity::new(),
            contributions: HashMap::new(),
        }),
        upstream: RefCell::new(None),
        this: this.clone(),
        _lease: source.lease(),
    });

    let mut initial = SetChange::new();
    for item in source.settled_value() {
        driver.attach(item, &mut initial);
    }
    cache.seed(&initial);

    let weak = Rc::downgrade(&driver);
    let connection = source.subscribe(move |change: &SetChange<T>| {
        if let Some(driver) = weak.upgrade() {
            driver.on_upstream(change);
        }
    });
    *driver.upstream.borrow_mut() = Some(connection);

    tracing::trace!(elements = source.count(), "expansion view created");
    SetView::new(cache, driver)
}
