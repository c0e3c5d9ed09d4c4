//! Tree-level structure management.
//!
//! Size and height queries, clearing, arena access helpers, the descent to
//! a target leaf, and the computation of sibling/ancestor relatives that the
//! insert and delete recursions thread through the tree.

use crate::types::{
    BPlusTreeMap, BranchNode, LeafNode, NodeId, NodeRef, Relatives, NULL_NODE,
};

// ============================================================================
// SIZE AND STATE
// ============================================================================

impl<K, V> BPlusTreeMap<K, V> {
    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of node levels: 0 when empty, 1 for a single-leaf tree.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Maximum entries per leaf.
    pub fn leaf_capacity(&self) -> usize {
        self.leaf_cap
    }

    /// Maximum separators per branch.
    pub fn branch_capacity(&self) -> usize {
        self.branch_cap
    }

    /// Mutation counter; cursors capture and revalidate it.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Drop all entries. Nulls the root and chain ends, zeroes count and
    /// height, and bumps the version even when the tree was already empty.
    pub fn clear(&mut self) {
        self.leaves.clear();
        self.branches.clear();
        self.root = None;
        self.head = NULL_NODE;
        self.tail = NULL_NODE;
        self.len = 0;
        self.height = 0;
        self.version += 1;
    }
}

// ============================================================================
// ARENA ACCESS
// ============================================================================

impl<K, V> BPlusTreeMap<K, V> {
    /// Reference to a leaf node by id.
    pub(crate) fn get_leaf(&self, id: NodeId) -> Option<&LeafNode<K, V>> {
        self.leaves.get(id)
    }

    /// Reference to a branch node by id.
    pub(crate) fn get_branch(&self, id: NodeId) -> Option<&BranchNode<K>> {
        self.branches.get(id)
    }

    /// Leaf by id; a dangling id is a structural bug.
    #[inline]
    pub(crate) fn leaf(&self, id: NodeId) -> &LeafNode<K, V> {
        self.leaves.get(id).expect("dangling leaf id")
    }

    /// Mutable leaf by id; a dangling id is a structural bug.
    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode<K, V> {
        self.leaves.get_mut(id).expect("dangling leaf id")
    }

    /// Branch by id; a dangling id is a structural bug.
    #[inline]
    pub(crate) fn branch(&self, id: NodeId) -> &BranchNode<K> {
        self.branches.get(id).expect("dangling branch id")
    }

    /// Mutable branch by id; a dangling id is a structural bug.
    #[inline]
    pub(crate) fn branch_mut(&mut self, id: NodeId) -> &mut BranchNode<K> {
        self.branches.get_mut(id).expect("dangling branch id")
    }

    /// Id of the first leaf in key order, if any.
    pub(crate) fn first_leaf_id(&self) -> Option<NodeId> {
        (self.head != NULL_NODE).then_some(self.head)
    }

    /// Id of the last leaf in key order, if any.
    pub(crate) fn last_leaf_id(&self) -> Option<NodeId> {
        (self.tail != NULL_NODE).then_some(self.tail)
    }
}

// ============================================================================
// DESCENT HELPERS
// ============================================================================

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Walk from the root to the leaf whose key range covers `key`.
    pub(crate) fn leaf_for(&self, key: &K) -> Option<NodeId> {
        let mut node = self.root?;
        loop {
            match node {
                NodeRef::Leaf(id) => return Some(id),
                NodeRef::Branch(id) => {
                    let branch = self.branch(id);
                    node = branch.child_at(branch.find_child_position(key));
                }
            }
        }
    }

    /// Smallest key anywhere under `node`, found by walking left-most
    /// children down to a leaf.
    pub(crate) fn subtree_first_key(&self, node: NodeRef) -> Option<&K> {
        let mut current = node;
        loop {
            match current {
                NodeRef::Leaf(id) => return self.leaf(id).first_key(),
                NodeRef::Branch(id) => current = self.branch(id).first_child(),
            }
        }
    }

    /// Compute the relatives of the child at `position` inside `branch_id`,
    /// given the branch's own relatives.
    ///
    /// An inner child has true siblings on both sides, divided by this
    /// branch's own separators. The left-most child inherits its left
    /// sibling from the parent's left relative: that cousin is the
    /// right-most child of the parent's left sibling, and the separator
    /// dividing them is the parent's own left-ancestor separator. The
    /// right-most child mirrors this.
    pub(crate) fn child_relatives(
        &self,
        branch_id: NodeId,
        position: usize,
        rel: &Relatives,
    ) -> Relatives {
        let branch = self.branch(branch_id);
        let sep_count = branch.len();

        let (left, left_ancestor, true_left) = if position > 0 {
            (
                Some(branch.child_at(position - 1)),
                Some((branch_id, position - 1)),
                true,
            )
        } else {
            match rel.left {
                Some(NodeRef::Branch(lid)) => (
                    Some(self.branch(lid).last_child()),
                    rel.left_ancestor,
                    false,
                ),
                _ => (None, None, false),
            }
        };

        let (right, right_ancestor, true_right) = if position < sep_count {
            (
                Some(branch.child_at(position + 1)),
                Some((branch_id, position)),
                true,
            )
        } else {
            match rel.right {
                Some(NodeRef::Branch(rid)) => (
                    Some(self.branch(rid).first_child()),
                    rel.right_ancestor,
                    false,
                ),
                _ => (None, None, false),
            }
        };

        Relatives {
            left,
            right,
            left_ancestor,
            right_ancestor,
            true_left,
            true_right,
        }
    }

    /// Overwrite the separator key at `(branch_id, index)`.
    pub(crate) fn set_separator_key(&mut self, branch_id: NodeId, index: usize, key: K) {
        let branch = self.branch_mut(branch_id);
        let sep = branch
            .seps
            .get_mut(index)
            .expect("separator index out of range");
        sep.key = key;
    }

    /// Swap the separator key at `(branch_id, index)` with `key`, returning
    /// the previous separator key.
    pub(crate) fn swap_separator_key(&mut self, branch_id: NodeId, index: usize, key: K) -> K {
        let branch = self.branch_mut(branch_id);
        let sep = branch
            .seps
            .get_mut(index)
            .expect("separator index out of range");
        std::mem::replace(&mut sep.key, key)
    }
}
