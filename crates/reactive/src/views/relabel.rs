//! `injective_map`: a derived view that relabels every element.
//!
//! With an injective transform no two source elements share an image, so
//! no multiplicity bookkeeping is needed: the view's change is the upstream
//! change with both sides transformed.

use super::{SetView, ViewCache};
use crate::change_set::SetChange;
use crate::observable::{Lease, ObservableSet};
use crate::subscription::Connection;
use alloc::boxed::Box;
use alloc::rc::Rc;
use cascade_core::Element;
use cascade_incremental::map_incremental;
use core::cell::RefCell;

struct RelabelDriver<T: Element, U: Element> {
    cache: Rc<ViewCache<U>>,
    transform: Box<dyn Fn(&T) -> U>,
    upstream: RefCell<Option<Connection>>,
    _lease: Lease,
}

impl<T: Element, U: Element> RelabelDriver<T, U> {
    fn relabel(&self, change: &SetChange<T>) -> SetChange<U> {
        let deltas = map_incremental(&change.to_deltas(), |item| (self.transform)(item));
        let relabeled = SetChange::from_deltas(&deltas);

        debug_assert_eq!(
            relabeled.len(),
            change.len(),
            "injective_map: transform mapped distinct elements to the same value"
        );
        debug_assert!(
            relabeled.inserted.iter().all(|item| !self.cache.contains(item)),
            "injective_map: transform mapped a new element onto an existing value"
        );
        relabeled
    }

    fn on_upstream(&self, change: &SetChange<T>) {
        let relabeled = self.relabel(change);
        self.cache.commit(relabeled);
    }
}

pub(crate) fn injective_map<T, U, S, F>(source: &S, transform: F) -> SetView<U>
where
    T: Element,
    U: Element,
    S: ObservableSet<T>,
    F: Fn(&T) -> U + 'static,
{
    let cache = ViewCache::new(source.runtime(), &**source.publisher());
    let driver = Rc::new(RelabelDriver {
        cache: cache.clone(),
        transform: Box::new(transform),
        upstream: RefCell::new(None),
        _lease: source.lease(),
    });

    cache.seed(&driver.relabel(&SetChange::insertion(source.settled_value())));

    let weak = Rc::downgrade(&driver);
    let connection = source.subscribe(move |change: &SetChange<T>| {
        if let Some(driver) = weak.upgrade() {
            driver.on_upstream(change);
        }
    });
    *driver.upstream.borrow_mut() = Some(connection);

    SetView::new(cache, driver)
}
