//! Cascade Incremental - weighted deltas and multiplicity accounting.
//!
//! Derived observable sets are maintained the way a Z-set is: every upstream
//! element edit becomes a `Delta` carrying a weight (+1 insert, -1 delete),
//! operators transform batches of deltas, and a `Multiplicity` table folds the
//! transformed deltas into per-element counts. An output element is present
//! exactly while its count is positive, so the only externally visible edits
//! are the `Appeared` / `Vanished` transitions.
//!
//! # Core Concepts
//!
//! - `Delta<T>`: A weighted change to one element
//! - `DeltaBatch<T>`: A batch of deltas, with consolidation helpers
//! - `Multiplicity<T>`: Counted set reporting presence transitions
//!
//! # Incremental Operators
//!
//! - `map_incremental`: Transforms deltas one-to-one
//! - `flat_map_incremental`: Expands each delta into several, keeping its weight
//!
//! # Example
//!
//! ```
//! use cascade_incremental::{map_incremental, Delta, Multiplicity, Transition};
//!
//! let mut counts = Multiplicity::new();
//! let deltas = vec![Delta::insert(2), Delta::insert(3)];
//!
//! // Integer halving collides 2 and 3 onto 1.
//! let halved = map_incremental(&deltas, |x| x / 2);
//! let transitions: Vec<_> = halved
//!     .into_iter()
//!     .map(|d| counts.apply(d.data, d.diff))
//!     .collect();
//!
//! assert_eq!(transitions, vec![Transition::Appeared, Transition::Unchanged]);
//! assert_eq!(counts.count(&1), 2);
//! ```

#![no_std]

extern crate alloc;

pub mod delta;
pub mod multiplicity;
pub mod operators;

pub use delta::{Delta, DeltaBatch, DeltaBatchExt};
pub use multiplicity::{Multiplicity, Transition};
pub use operators::{flat_map_incremental, map_incremental};
