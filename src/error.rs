//! Error types for the tree containers.

use thiserror::Error;

/// Result type alias using [`TreeError`].
pub type Result<T> = core::result::Result<T, TreeError>;

/// Errors surfaced by the fallible container operations.
///
/// These are precondition violations; no operation leaves the container in a
/// partially mutated state after returning one.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum TreeError {
    #[error("key not found")]
    KeyNotFound,

    #[error("duplicate key")]
    DuplicateKey,

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("node order must be at least 3, got {0}")]
    InvalidCapacity(usize),

    #[error("cannot disable duplicates on a non-empty container")]
    DuplicatesTransition,

    #[error("invalid range: upper bound sorts below lower bound")]
    InvalidRange,
}
