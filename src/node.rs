//! Node-local operations for leaves and branches.
//!
//! Everything here touches a single node's ring; operations that reach
//! siblings or ancestors (spill, borrow, merge) live in the tree-level
//! insert and delete modules, which own the arenas.

use crate::types::{BranchNode, Entry, LeafNode, NodeRef, NULL_NODE};

// ============================================================================
// LEAF NODE
// ============================================================================

impl<K: Ord, V> LeafNode<K, V> {
    /// Binary-search the entry ring for `key`. `Err` carries the insertion
    /// point.
    pub(crate) fn find(&self, key: &K) -> Result<usize, usize> {
        self.entries.binary_search_by(|entry| entry.key.cmp(key))
    }

    /// Number of entries in this leaf.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if this leaf holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if this leaf is at capacity.
    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    /// The minimum number of entries a non-root leaf must keep. Clamped to
    /// one so capacity-one leaves never linger empty in the chain.
    pub(crate) fn min_len(&self) -> usize {
        (self.entries.capacity() / 2).max(1)
    }

    /// Returns true if this leaf meets the half-full bound.
    pub(crate) fn is_half_full(&self) -> bool {
        self.entries.len() >= self.min_len()
    }

    /// Returns true if this leaf can give an entry away and stay half-full.
    pub(crate) fn can_donate(&self) -> bool {
        self.entries.len() > self.min_len()
    }

    /// Smallest key in this leaf.
    pub(crate) fn first_key(&self) -> Option<&K> {
        self.entries.first().map(|entry| &entry.key)
    }

    /// Largest key in this leaf.
    pub(crate) fn last_key(&self) -> Option<&K> {
        self.entries.last().map(|entry| &entry.key)
    }

    /// Move the upper half of the entries into a new, unchained leaf. The
    /// caller wires the chain and allocates the result.
    pub(crate) fn split(&mut self) -> LeafNode<K, V> {
        LeafNode {
            entries: self.entries.split_right(),
            prev: NULL_NODE,
            next: NULL_NODE,
        }
    }

    /// Entry at `index`.
    pub(crate) fn entry(&self, index: usize) -> Option<&Entry<K, V>> {
        self.entries.get(index)
    }
}

// ============================================================================
// BRANCH NODE
// ============================================================================

impl<K: Ord> BranchNode<K> {
    /// Position of the child that should contain `key`, in `0..=len`.
    /// Position 0 is the `left` slot; position `p > 0` is separator
    /// `p - 1`'s right child.
    pub(crate) fn find_child_position(&self, key: &K) -> usize {
        match self.seps.binary_search_by(|sep| sep.key.cmp(key)) {
            // Separator keys belong to their right subtree.
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Child at `position`.
    pub(crate) fn child_at(&self, position: usize) -> NodeRef {
        if position == 0 {
            self.left
        } else {
            self.seps
                .get(position - 1)
                .map(|sep| sep.right)
                .expect("child position out of range")
        }
    }

    /// Left-most child.
    pub(crate) fn first_child(&self) -> NodeRef {
        self.left
    }

    /// Right-most child.
    pub(crate) fn last_child(&self) -> NodeRef {
        self.seps.last().map(|sep| sep.right).unwrap_or(self.left)
    }

    /// Number of separators in this branch.
    pub fn len(&self) -> usize {
        self.seps.len()
    }

    /// Returns true if this branch holds no separators.
    pub fn is_empty(&self) -> bool {
        self.seps.is_empty()
    }

    /// Returns true if this branch is at capacity.
    pub fn is_full(&self) -> bool {
        self.seps.is_full()
    }

    /// The minimum number of separators a non-root branch must keep.
    pub(crate) fn min_len(&self) -> usize {
        self.seps.capacity() / 2
    }

    /// Returns true if this branch meets the half-full bound.
    pub(crate) fn is_half_full(&self) -> bool {
        self.seps.len() >= self.min_len()
    }

    /// Returns true if this branch can give a separator away and stay
    /// half-full.
    pub(crate) fn can_donate(&self) -> bool {
        self.seps.len() > self.min_len()
    }
}
