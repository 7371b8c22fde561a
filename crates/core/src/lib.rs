//! Cascade Core - Core types shared by the Cascade crates.
//!
//! This crate provides the foundational types for incremental observable sets:
//!
//! - `Element`: The bound every set element satisfies (clone, equality, hashing)
//! - `Handle`: An opaque identity key for reference-like elements
//! - `HandleAllocator`: Issues handles from a private counter
//! - `Error`: Error types for fallible collection operations
//!
//! # Example
//!
//! ```rust
//! use cascade_core::{Handle, HandleAllocator};
//!
//! let mut handles = HandleAllocator::new();
//! let a = handles.issue();
//! let b = handles.issue();
//!
//! assert_ne!(a, b);
//! assert!(a < b);
//! ```

#![no_std]

extern crate alloc;

mod element;
mod error;
mod handle;

pub use element::Element;
pub use error::{Error, Result};
pub use handle::{next_handle, Handle, HandleAllocator};
