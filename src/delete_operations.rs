//! Delete operations for the B+ tree.
//!
//! Removal mirrors insertion: O(1) edge fast paths at the chain ends, then
//! a recursive descent threading sibling/ancestor relatives. An underfull
//! node borrows one element from an over-full sibling (cousins allowed)
//! before merging with a true sibling. A merge removes one separator from
//! the parent and may cascade; a root branch left with no separators hands
//! the tree to its single child.

use crate::types::{
    BPlusTreeMap, NodeId, NodeRef, Relatives, RemoveArgs, Separator, NULL_NODE,
};

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Remove a key and return its value, or `None` when absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(1, "one").unwrap();
    /// assert_eq!(tree.remove(&1), Some("one"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let root = self.root?;
        let head_id = self.head;
        let tail_id = self.tail;

        // Reject keys outside the occupied range without descending.
        {
            let first = self.leaf(head_id).first_key()?;
            if key < first {
                return None;
            }
        }
        {
            let last = self.leaf(tail_id).last_key()?;
            if key > last {
                return None;
            }
        }

        // O(1) edge removal when the edge leaf stays half-full afterwards
        // or is the root. Edge entries never back a separator key, so no
        // ancestor updates are needed.
        let root_is_leaf = matches!(root, NodeRef::Leaf(_));
        let head_hit = self
            .leaf(head_id)
            .first_key()
            .map_or(false, |first| key == first);
        if head_hit {
            let head = self.leaf(head_id);
            if root_is_leaf || head.len() > head.min_len() {
                let entry = self
                    .leaf_mut(head_id)
                    .entries
                    .pop_first()
                    .expect("head leaf is non-empty");
                self.finish_removal();
                return Some(entry.value);
            }
        }
        let tail_hit = self
            .leaf(tail_id)
            .last_key()
            .map_or(false, |last| key == last);
        if tail_hit {
            let tail = self.leaf(tail_id);
            if root_is_leaf || tail.len() > tail.min_len() {
                let entry = self
                    .leaf_mut(tail_id)
                    .entries
                    .pop_last()
                    .expect("tail leaf is non-empty");
                self.finish_removal();
                return Some(entry.value);
            }
        }

        // Full descent from the root.
        let mut args = RemoveArgs {
            key,
            removed: false,
            value: None,
        };
        match root {
            NodeRef::Leaf(id) => {
                self.leaf_remove(id, &mut args, Relatives::root());
            }
            NodeRef::Branch(id) => {
                self.branch_remove(id, &mut args, Relatives::root());
            }
        }
        if !args.removed {
            return None;
        }

        // A root branch stripped of its last separator hands the tree to
        // its single remaining child.
        if let Some(NodeRef::Branch(id)) = self.root {
            if self.branch(id).is_empty() {
                let child = self.branch(id).left;
                self.branches.deallocate(id);
                self.root = Some(child);
                self.height -= 1;
            }
        }

        self.finish_removal();
        args.value
    }

    /// Remove the entry with the smallest key.
    pub fn remove_first(&mut self) -> Option<(K, V)> {
        let head_id = self.first_leaf_id()?;
        let key = self.leaf(head_id).first_key()?.clone();
        let value = self.remove(&key)?;
        Some((key, value))
    }

    /// Remove the entry with the largest key.
    pub fn remove_last(&mut self) -> Option<(K, V)> {
        let tail_id = self.last_leaf_id()?;
        let key = self.leaf(tail_id).last_key()?.clone();
        let value = self.remove(&key)?;
        Some((key, value))
    }

    /// Count and version bookkeeping shared by every successful removal,
    /// including dropping the root leaf when the tree just became empty.
    fn finish_removal(&mut self) {
        self.len -= 1;
        self.version += 1;
        if self.len == 0 {
            if let Some(NodeRef::Leaf(id)) = self.root {
                self.leaves.deallocate(id);
            }
            self.root = None;
            self.head = NULL_NODE;
            self.tail = NULL_NODE;
            self.height = 0;
        }
    }

    /// Remove from the subtree rooted at leaf `id`. Returns true when this
    /// leaf merged away (or absorbed its right sibling) and the parent must
    /// drop a separator.
    fn leaf_remove(&mut self, id: NodeId, args: &mut RemoveArgs<'_, K, V>, rel: Relatives) -> bool {
        let Ok(index) = self.leaf(id).find(args.key) else {
            return false;
        };
        let entry = self.leaf_mut(id).entries.remove_at(index);
        args.removed = true;
        args.value = Some(entry.value);

        if self.leaf(id).is_half_full() || !rel.has_siblings() {
            return false;
        }

        // Borrow the previous leaf's last entry; the separator dividing us
        // from it becomes the borrowed key.
        if let Some((anc_id, anc_index)) = rel.left_ancestor {
            let prev = self.leaf(id).prev;
            if prev != NULL_NODE && self.leaf(prev).can_donate() {
                let entry = self
                    .leaf_mut(prev)
                    .entries
                    .pop_last()
                    .expect("donor leaf is non-empty");
                let sep_key = entry.key.clone();
                self.leaf_mut(id).entries.push_first(entry);
                self.set_separator_key(anc_id, anc_index, sep_key);
                return false;
            }
        }

        // Borrow the next leaf's first entry; the separator dividing us
        // from it follows that leaf's new first key.
        if let Some((anc_id, anc_index)) = rel.right_ancestor {
            let next = self.leaf(id).next;
            if next != NULL_NODE && self.leaf(next).can_donate() {
                let entry = self
                    .leaf_mut(next)
                    .entries
                    .pop_first()
                    .expect("donor leaf is non-empty");
                self.leaf_mut(id).entries.push_last(entry);
                let new_first = self
                    .leaf(next)
                    .first_key()
                    .expect("donor leaf is non-empty")
                    .clone();
                self.set_separator_key(anc_id, anc_index, new_first);
                return false;
            }
        }

        // Merge into the true left sibling, splicing this leaf out of the
        // chain before its slot is released.
        if let (true, Some(NodeRef::Leaf(left_id))) = (rel.true_left, rel.left) {
            let dead = self.leaves.deallocate(id).expect("merging leaf exists");
            let next = dead.next;
            self.leaf_mut(left_id).entries.merge_from(dead.entries);
            self.leaf_mut(left_id).next = next;
            if next != NULL_NODE {
                self.leaf_mut(next).prev = left_id;
            } else {
                self.tail = left_id;
            }
            return true;
        }

        // Otherwise absorb the true right sibling.
        if let (true, Some(NodeRef::Leaf(right_id))) = (rel.true_right, rel.right) {
            let dead = self.leaves.deallocate(right_id).expect("merging leaf exists");
            let next = dead.next;
            self.leaf_mut(id).entries.merge_from(dead.entries);
            self.leaf_mut(id).next = next;
            if next != NULL_NODE {
                self.leaf_mut(next).prev = id;
            } else {
                self.tail = id;
            }
            return true;
        }

        false
    }

    /// Remove from the subtree rooted at branch `id`. Returns true when
    /// this branch merged away (or absorbed its right sibling).
    fn branch_remove(
        &mut self,
        id: NodeId,
        args: &mut RemoveArgs<'_, K, V>,
        rel: Relatives,
    ) -> bool {
        let position = self.branch(id).find_child_position(args.key);
        let child = self.branch(id).child_at(position);
        let child_rel = self.child_relatives(id, position, &rel);

        let merged = match child {
            NodeRef::Leaf(leaf_id) => self.leaf_remove(leaf_id, args, child_rel),
            NodeRef::Branch(branch_id) => self.branch_remove(branch_id, args, child_rel),
        };
        if !merged {
            return false;
        }

        // Drop the separator of the merged-away child: the child itself
        // when it folded into its left sibling, or separator 0 when the
        // left-most child absorbed its right sibling.
        let sep_index = position.saturating_sub(1);
        let _ = self.branch_mut(id).seps.remove_at(sep_index);

        if self.branch(id).is_half_full() || !rel.has_siblings() {
            return false;
        }

        // Borrow the left sibling's last separator, rotating it through the
        // shared ancestor and our `left` slot.
        if let (Some(NodeRef::Branch(left_id)), Some((anc_id, anc_index))) =
            (rel.left, rel.left_ancestor)
        {
            if self.branch(left_id).can_donate() {
                let popped = self
                    .branch_mut(left_id)
                    .seps
                    .pop_last()
                    .expect("donor branch is non-empty");
                let old_left = self.branch(id).left;
                self.branch_mut(id).left = popped.right;
                let demoted = self.swap_separator_key(anc_id, anc_index, popped.key);
                self.branch_mut(id).seps.push_first(Separator {
                    key: demoted,
                    right: old_left,
                });
                return false;
            }
        }

        // Borrow the right sibling's first separator, symmetric through its
        // `left` slot.
        if let (Some(NodeRef::Branch(right_id)), Some((anc_id, anc_index))) =
            (rel.right, rel.right_ancestor)
        {
            if self.branch(right_id).can_donate() {
                let popped = self
                    .branch_mut(right_id)
                    .seps
                    .pop_first()
                    .expect("donor branch is non-empty");
                let old_right_left = self.branch(right_id).left;
                self.branch_mut(right_id).left = popped.right;
                let demoted = self.swap_separator_key(anc_id, anc_index, popped.key);
                self.branch_mut(id).seps.push_last(Separator {
                    key: demoted,
                    right: old_right_left,
                });
                return false;
            }
        }

        // Merge into the true left sibling; the shared ancestor's separator
        // key is demoted to join the two children lists.
        if let (true, Some(NodeRef::Branch(left_id)), Some((anc_id, anc_index))) =
            (rel.true_left, rel.left, rel.left_ancestor)
        {
            let demoted = self
                .branch(anc_id)
                .seps
                .get(anc_index)
                .expect("ancestor separator exists")
                .key
                .clone();
            let dead = self.branches.deallocate(id).expect("merging branch exists");
            self.branch_mut(left_id).seps.push_last(Separator {
                key: demoted,
                right: dead.left,
            });
            self.branch_mut(left_id).seps.merge_from(dead.seps);
            return true;
        }

        // Otherwise absorb the true right sibling.
        if let (true, Some(NodeRef::Branch(right_id)), Some((anc_id, anc_index))) =
            (rel.true_right, rel.right, rel.right_ancestor)
        {
            let demoted = self
                .branch(anc_id)
                .seps
                .get(anc_index)
                .expect("ancestor separator exists")
                .key
                .clone();
            let dead = self
                .branches
                .deallocate(right_id)
                .expect("merging branch exists");
            self.branch_mut(id).seps.push_last(Separator {
                key: demoted,
                right: dead.left,
            });
            self.branch_mut(id).seps.merge_from(dead.seps);
            return true;
        }

        false
    }
}
