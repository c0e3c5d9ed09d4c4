//! Error handling and result types for tree operations.
//!
//! Recoverable, data-dependent conditions (duplicate keys, missing keys,
//! empty collections, concurrent modification) are reported as [`TreeError`]
//! values. Contract violations on the ring (out-of-range indices, mutating a
//! constrained ring) panic with a message naming the condition, mirroring the
//! standard collection contracts.

/// Error type for B+ tree and ring operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// `insert` was called with a key already present in the tree.
    DuplicateKey,
    /// Key not found in the tree.
    KeyNotFound,
    /// `first`/`last`/`next_nearest` called on an empty collection.
    EmptyCollection,
    /// Invalid capacity specified at construction.
    InvalidCapacity(String),
    /// A cursor observed a version change in the underlying collection.
    ConcurrentModification,
}

impl TreeError {
    /// Create an InvalidCapacity error with context.
    pub fn invalid_capacity(kind: &str, capacity: usize, min_required: usize) -> Self {
        Self::InvalidCapacity(format!(
            "{} capacity {} is invalid (minimum required: {})",
            kind, capacity, min_required
        ))
    }

    /// Check if this error is a capacity error.
    pub fn is_capacity_error(&self) -> bool {
        matches!(self, Self::InvalidCapacity(_))
    }
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::DuplicateKey => write!(f, "Key already present in tree"),
            TreeError::KeyNotFound => write!(f, "Key not found in tree"),
            TreeError::EmptyCollection => write!(f, "Collection is empty"),
            TreeError::InvalidCapacity(msg) => write!(f, "Invalid capacity: {}", msg),
            TreeError::ConcurrentModification => {
                write!(f, "Collection was modified during iteration")
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Result type for tree operations that may fail.
pub type TreeResult<T> = Result<T, TreeError>;

/// Result type for tree construction.
pub type InitResult<T> = Result<T, TreeError>;
