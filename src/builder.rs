//! Bulk-loading builder.
//!
//! [`TreeBuilder`] constructs a balanced tree in O(n) from ordered input by
//! appending entries to a growing chain of full leaves, then erecting the
//! branch levels in one pass. Out-of-order input (or any removal)
//! transparently commits the bulk structure and downgrades to the tree's
//! iterative path; the bulk-built leaves are committed as-is, never copied.

use std::cmp::Ordering;

use crate::construction::DEFAULT_CAPACITY;
use crate::error::InitResult;
use crate::ring::RingArray;
use crate::types::{
    BPlusTreeMap, BranchNode, Entry, LeafNode, NodeId, NodeRef, Separator, NULL_NODE,
};

/// Builds a [`BPlusTreeMap`] by bulk loading, falling back to iterative
/// insertion when the input stops being ordered.
///
/// # Examples
///
/// ```
/// use bptree::TreeBuilder;
///
/// let mut builder = TreeBuilder::new(16).unwrap();
/// for i in 0..100 {
///     builder.insert(i, i * 10);
/// }
/// let tree = builder.build();
/// assert_eq!(tree.len(), 100);
/// assert_eq!(tree.get(&42), Some(&420));
/// ```
pub struct TreeBuilder<K, V> {
    tree: BPlusTreeMap<K, V>,
    /// Nodes of the level currently being built, oldest first.
    level: RingArray<NodeRef>,
    /// Leaf currently being filled; `NULL_NODE` before the first insert.
    current_leaf: NodeId,
    /// False once an order violation or removal forced the iterative path.
    bulk: bool,
    /// True once the bulk structure has been committed to the tree.
    finished: bool,
}

impl<K: Ord + Clone, V> TreeBuilder<K, V> {
    /// Create a builder using `capacity` for both node kinds.
    pub fn new(capacity: usize) -> InitResult<Self> {
        Self::with_capacities(capacity, capacity)
    }

    /// Create a builder with distinct leaf and branch capacities.
    pub fn with_capacities(leaf_cap: usize, branch_cap: usize) -> InitResult<Self> {
        Ok(Self {
            tree: BPlusTreeMap::with_capacities(leaf_cap, branch_cap)?,
            level: RingArray::new(),
            current_leaf: NULL_NODE,
            bulk: true,
            finished: false,
        })
    }

    /// Create a builder with the default capacity.
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY).expect("default capacity is valid")
    }

    /// Returns true while input is still being bulk-loaded.
    pub fn is_bulk_loading(&self) -> bool {
        self.bulk
    }

    /// Number of entries accepted so far.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if no entries have been accepted.
    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    /// Add an entry. Ordered input appends in O(1); a repeated key replaces
    /// the previous value; an out-of-order key commits the bulk structure
    /// and routes this and all later operations through the iterative path.
    pub fn insert(&mut self, key: K, value: V) {
        if !self.bulk {
            self.tree.insert_or_replace(key, value);
            return;
        }

        // First entry: the first leaf opens the chain.
        if self.current_leaf == NULL_NODE {
            let mut leaf = LeafNode::new(self.tree.leaf_cap);
            leaf.entries.push_last(Entry { key, value });
            let id = self.tree.leaves.allocate(leaf);
            self.tree.head = id;
            self.tree.tail = id;
            self.tree.height = 1;
            self.tree.len = 1;
            self.level.push_last(NodeRef::Leaf(id));
            self.current_leaf = id;
            return;
        }

        let cmp = {
            let leaf = self.tree.leaf(self.current_leaf);
            key.cmp(leaf.last_key().expect("bulk leaf is non-empty"))
        };
        match cmp {
            Ordering::Equal => {
                let last = self
                    .tree
                    .leaf_mut(self.current_leaf)
                    .entries
                    .last_mut()
                    .expect("bulk leaf is non-empty");
                last.value = value;
            }
            Ordering::Greater => {
                if self.tree.leaf(self.current_leaf).is_full() {
                    let mut leaf = LeafNode::new(self.tree.leaf_cap);
                    leaf.prev = self.current_leaf;
                    leaf.entries.push_last(Entry { key, value });
                    let id = self.tree.leaves.allocate(leaf);
                    self.tree.leaf_mut(self.current_leaf).next = id;
                    self.level.push_last(NodeRef::Leaf(id));
                    self.current_leaf = id;
                } else {
                    self.tree
                        .leaf_mut(self.current_leaf)
                        .entries
                        .push_last(Entry { key, value });
                }
                self.tree.len += 1;
            }
            Ordering::Less => {
                // Order violation: commit what was bulk-built, then fall
                // back to iterative insertion for good.
                self.finish();
                self.bulk = false;
                self.tree.insert_or_replace(key, value);
            }
        }
    }

    /// Remove a key. Bulk loading does not support mid-stream deletion, so
    /// this always commits the bulk structure first.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        if self.bulk {
            self.finish();
            self.bulk = false;
        }
        self.tree.remove(key)
    }

    /// Commit the structure and hand the finished tree over.
    pub fn build(mut self) -> BPlusTreeMap<K, V> {
        self.finish();
        self.tree
    }

    /// Erect the branch levels over the bulk-built leaf chain and commit
    /// root, tail, and height. Idempotent; the head leaf and every
    /// bulk-built leaf keep their identity.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        // Nothing was added: the tree stays empty.
        if self.current_leaf == NULL_NODE {
            return;
        }

        if self.level.len() == 1 {
            self.tree.root = Some(NodeRef::Leaf(self.current_leaf));
            self.tree.tail = self.current_leaf;
            self.tree.version += 1;
            return;
        }

        // Every leaf but the last was filled to capacity; top the last one
        // up from its left neighbour until it is half-full.
        let min = (self.tree.leaf_cap / 2).max(1);
        while self.tree.leaf(self.current_leaf).len() < min {
            let prev = self.tree.leaf(self.current_leaf).prev;
            let Some(entry) = self.tree.leaf_mut(prev).entries.pop_last() else {
                break;
            };
            self.tree.leaf_mut(self.current_leaf).entries.push_first(entry);
        }

        // Erect branch levels until a single node remains. The first node
        // consumed opens a branch as its `left`; the rest become separators
        // keyed by their subtree's first key; overflow opens the next
        // branch.
        while self.level.len() > 1 {
            let count = self.level.len();
            let mut prev_branch: Option<NodeId> = None;
            let mut current_branch: Option<NodeId> = None;
            for _ in 0..count {
                let node = self.level.pop_first().expect("level queue is non-empty");
                match current_branch {
                    Some(branch_id) if !self.tree.branch(branch_id).is_full() => {
                        let key = self
                            .tree
                            .subtree_first_key(node)
                            .expect("subtree is non-empty")
                            .clone();
                        self.tree
                            .branch_mut(branch_id)
                            .seps
                            .push_last(Separator { key, right: node });
                    }
                    _ => {
                        let branch = BranchNode::new(self.tree.branch_cap, node);
                        let id = self.tree.branches.allocate(branch);
                        self.level.push_last(NodeRef::Branch(id));
                        prev_branch = current_branch;
                        current_branch = Some(id);
                    }
                }
            }

            // An underfull last branch borrows from its left neighbour by
            // rotating one separator: the popped child becomes its `left`,
            // the demoted old `left` re-enters keyed by its first key.
            if let (Some(donor), Some(last)) = (prev_branch, current_branch) {
                let branch_min = self.tree.branch_cap / 2;
                while self.tree.branch(last).len() < branch_min {
                    let Some(popped) = self.tree.branch_mut(donor).seps.pop_last() else {
                        break;
                    };
                    let old_left = self.tree.branch(last).left;
                    let key = self
                        .tree
                        .subtree_first_key(old_left)
                        .expect("subtree is non-empty")
                        .clone();
                    self.tree.branch_mut(last).left = popped.right;
                    self.tree
                        .branch_mut(last)
                        .seps
                        .push_first(Separator { key, right: old_left });
                }
            }

            self.tree.height += 1;
        }

        let root = self.level.pop_first().expect("a root node remains");
        self.tree.root = Some(root);

        // The tail is the right-most leaf under the new root.
        let mut node = root;
        loop {
            match node {
                NodeRef::Leaf(id) => {
                    self.tree.tail = id;
                    break;
                }
                NodeRef::Branch(id) => node = self.tree.branch(id).last_child(),
            }
        }
        self.tree.version += 1;
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for BPlusTreeMap<K, V> {
    /// Collect through the bulk-loading builder: sorted input loads in
    /// O(n), unsorted input transparently downgrades.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = TreeBuilder::with_default_capacity();
        for (key, value) in iter {
            builder.insert(key, value);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaf_build() {
        let mut builder = TreeBuilder::new(4).unwrap();
        builder.insert(1, "a");
        builder.insert(2, "b");
        let tree = builder.build();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.get(&1), Some(&"a"));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn empty_build_yields_empty_tree() {
        let builder = TreeBuilder::<i32, i32>::new(4).unwrap();
        let tree = builder.build();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn duplicate_keys_replace_during_bulk() {
        let mut builder = TreeBuilder::new(4).unwrap();
        builder.insert(1, "a");
        builder.insert(1, "b");
        let tree = builder.build();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1), Some(&"b"));
    }

    #[test]
    fn remove_forces_passthrough() {
        let mut builder = TreeBuilder::new(4).unwrap();
        for i in 0..10 {
            builder.insert(i, i);
        }
        assert!(builder.is_bulk_loading());
        assert_eq!(builder.remove(&3), Some(3));
        assert!(!builder.is_bulk_loading());
        let tree = builder.build();
        assert_eq!(tree.len(), 9);
        assert!(!tree.contains_key(&3));
        tree.check_invariants().unwrap();
    }
}
