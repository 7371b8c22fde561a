//! Incremental operators over delta batches.
//!
//! - Map: transforms each delta's element, keeping its weight
//! - Flat map: expands each delta into one delta per produced element

mod map;

pub use map::{flat_map_incremental, map_incremental};
