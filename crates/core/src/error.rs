//! Error types for Cascade.

use core::fmt;

/// Result type alias for Cascade operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for fallible collection operations.
///
/// Most misuse of the reactive core (a non-injective transform handed to
/// `injective_map`, a runaway feedback loop between callbacks) is a contract
/// violation reported by a panic, not an `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Positional access past the end of a sequence.
    IndexOutOfBounds {
        index: usize,
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IndexOutOfBounds { index, len } => {
                write!(f, "Index {} out of bounds for length {}", index, len)
            }
        }
    }
}

impl Error {
    /// Creates an index out of bounds error.
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Error::IndexOutOfBounds { index, len }
    }
}
