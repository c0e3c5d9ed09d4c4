//! Construction and initialization for the tree and its nodes.
//!
//! Capacity validation lives here: leaves need room for at least one entry,
//! branches for at least two separators. An empty tree has no root node at
//! all; the first insertion allocates the root leaf.

use crate::arena::Arena;
use crate::error::{InitResult, TreeError};
use crate::ring::RingArray;
use crate::types::{
    BPlusTreeMap, BranchNode, LeafNode, NodeRef, MIN_BRANCH_CAPACITY, MIN_LEAF_CAPACITY, NULL_NODE,
};

/// Default capacity for both node kinds.
pub const DEFAULT_CAPACITY: usize = 16;

impl<K, V> BPlusTreeMap<K, V> {
    /// Create a B+ tree using `capacity` for both leaves and branches.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPlusTreeMap;
    ///
    /// let tree = BPlusTreeMap::<i32, String>::new(16).unwrap();
    /// assert!(tree.is_empty());
    /// ```
    pub fn new(capacity: usize) -> InitResult<Self> {
        Self::with_capacities(capacity, capacity)
    }

    /// Create a B+ tree with distinct leaf and branch capacities.
    ///
    /// # Arguments
    ///
    /// * `leaf_cap` - Maximum entries per leaf (minimum 1)
    /// * `branch_cap` - Maximum separators per branch (minimum 2)
    pub fn with_capacities(leaf_cap: usize, branch_cap: usize) -> InitResult<Self> {
        if leaf_cap < MIN_LEAF_CAPACITY {
            return Err(TreeError::invalid_capacity(
                "leaf",
                leaf_cap,
                MIN_LEAF_CAPACITY,
            ));
        }
        if branch_cap < MIN_BRANCH_CAPACITY {
            return Err(TreeError::invalid_capacity(
                "branch",
                branch_cap,
                MIN_BRANCH_CAPACITY,
            ));
        }

        Ok(Self {
            leaf_cap,
            branch_cap,
            root: None,
            head: NULL_NODE,
            tail: NULL_NODE,
            height: 0,
            len: 0,
            version: 0,
            leaves: Arena::new(),
            branches: Arena::new(),
        })
    }

    /// Create a B+ tree with the default capacity.
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY).expect("default capacity is valid")
    }
}

impl<K, V> LeafNode<K, V> {
    /// Creates an empty, unchained leaf with the given entry capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: RingArray::fixed(capacity),
            prev: NULL_NODE,
            next: NULL_NODE,
        }
    }
}

impl<K> BranchNode<K> {
    /// Creates a branch over `left` with the given separator capacity.
    pub(crate) fn new(capacity: usize, left: NodeRef) -> Self {
        Self {
            left,
            seps: RingArray::fixed(capacity),
        }
    }
}

impl<K, V> Default for BPlusTreeMap<K, V> {
    /// Create a B+ tree with the default capacity.
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_with_valid_capacity() {
        let tree = BPlusTreeMap::<i32, String>::new(16).unwrap();
        assert_eq!(tree.leaf_capacity(), 16);
        assert_eq!(tree.branch_capacity(), 16);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn leaf_capacity_below_minimum_is_rejected() {
        let result = BPlusTreeMap::<i32, String>::with_capacities(0, 4);
        assert!(result.unwrap_err().is_capacity_error());
    }

    #[test]
    fn branch_capacity_below_minimum_is_rejected() {
        let result = BPlusTreeMap::<i32, String>::with_capacities(4, 1);
        assert!(result.unwrap_err().is_capacity_error());
    }

    #[test]
    fn default_uses_default_capacity() {
        let tree = BPlusTreeMap::<i32, String>::default();
        assert_eq!(tree.leaf_capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn smallest_legal_capacities_are_accepted() {
        let tree = BPlusTreeMap::<i32, i32>::with_capacities(1, 2);
        assert!(tree.is_ok());
    }
}
