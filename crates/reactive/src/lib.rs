//! Cascade Reactive - observable sets with incrementally maintained views.
//!
//! Mutable sources publish their edits as changes; derived views consume
//! those changes and keep their own value up to date without recomputing it.
//! All publishing goes through a `Runtime`, which coalesces every change made
//! during one transaction into a single change per observer and delivers them
//! upstream-before-downstream once the outermost transaction closes.
//!
//! # Core Concepts
//!
//! - `SetChange`: The minimal edit between two values of a set
//! - `Runtime` / `Transaction`: Scopes that batch and order delivery
//! - `SetVariable`, `Variable`, `ArrayVariable`: Mutable sources
//! - `SetView`: A derived set, built by the `ObservableSet` operators
//! - `Connection`: A subscription that ends when dropped
//!
//! # Operators
//!
//! - `injective_map`: Relabels every element
//! - `map` / `map_field`: Images that may collide, optionally through an
//!   observable field
//! - `flat_map` / `flat_map_snapshot`: Unions of per-element collections
//!
//! # Example
//!
//! ```
//! use cascade_reactive::{ObservableSet, Runtime, SetChange, SetVariable};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let rt = Runtime::new();
//! let numbers = SetVariable::from_items(&rt, [0, 2, 3]);
//! let halves = numbers.map(|x| x / 2);
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let sink = log.clone();
//! let _conn = halves.subscribe(move |change: &SetChange<i32>| {
//!     sink.borrow_mut().push(change.clone());
//! });
//!
//! // 2 and 3 both map to 1; one of them leaving changes nothing.
//! numbers.remove(&3);
//! assert!(log.borrow().is_empty());
//!
//! rt.transaction(|| {
//!     numbers.insert(8);
//!     numbers.insert(9);
//! });
//! assert_eq!(log.borrow().len(), 1);
//! assert_eq!(log.borrow()[0].sorted_inserted(), vec![4]);
//! ```

#![no_std]

extern crate alloc;

pub mod array;
pub mod change_set;
pub mod field;
pub mod observable;
pub mod publisher;
pub mod runtime;
pub mod set_variable;
pub mod subscription;
pub mod variable;
pub mod views;

pub use array::ArrayVariable;
pub use change_set::{Change, SetChange, ValueChange};
pub use field::{Field, Nested};
pub use observable::{Lease, ObservableSet, SetSource, ValueSource};
pub use publisher::{Publisher, Ranked};
pub use runtime::{Runtime, RuntimeConfig, Transaction, DEFAULT_MAX_FLUSH_STEPS};
pub use set_variable::SetVariable;
pub use subscription::{ChangeCallback, Connection, SubscriptionId};
pub use variable::Variable;
pub use views::SetView;

pub use cascade_core::{next_handle, Element, Error, Handle, HandleAllocator, Result};
