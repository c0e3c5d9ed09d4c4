//! Insert operations for the B+ tree.
//!
//! Every public insert variant routes through one upsert path parameterized
//! by an [`UpsertPolicy`]: the policy makes the value for a fresh key and
//! resolves against an existing one. The path tries the O(1) edge fast paths
//! first, then descends recursively with sibling/ancestor relatives so a
//! full node can spill one element to a neighbour before resorting to a
//! split. Splits propagate a separator upward; a split root grows the tree
//! by one level.

use std::cmp::Ordering;

use crate::error::{TreeError, TreeResult};
use crate::types::{
    BPlusTreeMap, BranchNode, Entry, InsertOutcome, LeafNode, NodeId, NodeRef, Relatives,
    Separator, UpsertArgs, UpsertPolicy, NULL_NODE,
};

// ============================================================================
// UPSERT POLICIES
// ============================================================================

/// Fails with `DuplicateKey` when the key is already present.
struct StrictPolicy<V> {
    value: Option<V>,
}

impl<K, V> UpsertPolicy<K, V> for StrictPolicy<V> {
    fn make(&mut self, _key: &K) -> V {
        self.value.take().expect("value consumed twice")
    }

    fn resolve(&mut self, _key: &K, _existing: &mut V) -> TreeResult<()> {
        Err(TreeError::DuplicateKey)
    }
}

/// Keeps the existing value when the key is already present.
struct KeepPolicy<V> {
    value: Option<V>,
}

impl<K, V> UpsertPolicy<K, V> for KeepPolicy<V> {
    fn make(&mut self, _key: &K) -> V {
        self.value.take().expect("value consumed twice")
    }

    fn resolve(&mut self, _key: &K, _existing: &mut V) -> TreeResult<()> {
        Ok(())
    }
}

/// Overwrites the existing value when the key is already present.
struct ReplacePolicy<V> {
    value: Option<V>,
}

impl<K, V> UpsertPolicy<K, V> for ReplacePolicy<V> {
    fn make(&mut self, _key: &K) -> V {
        self.value.take().expect("value consumed twice")
    }

    fn resolve(&mut self, _key: &K, existing: &mut V) -> TreeResult<()> {
        *existing = self.value.take().expect("value consumed twice");
        Ok(())
    }
}

/// Merges the new value into the existing one with a caller closure.
struct MergePolicy<V, F> {
    value: Option<V>,
    merge: Option<F>,
}

impl<K, V, F> UpsertPolicy<K, V> for MergePolicy<V, F>
where
    F: FnOnce(&K, &mut V, V),
{
    fn make(&mut self, _key: &K) -> V {
        self.value.take().expect("value consumed twice")
    }

    fn resolve(&mut self, key: &K, existing: &mut V) -> TreeResult<()> {
        let merge = self.merge.take().expect("merge closure consumed twice");
        let value = self.value.take().expect("value consumed twice");
        merge(key, existing, value);
        Ok(())
    }
}

/// Builds the value lazily from an argument; updates consume the same
/// argument.
struct WithArgPolicy<A, FM, FU> {
    arg: A,
    make_fn: Option<FM>,
    update_fn: Option<FU>,
}

impl<K, V, A, FM, FU> UpsertPolicy<K, V> for WithArgPolicy<A, FM, FU>
where
    FM: FnOnce(&K, &mut A) -> V,
    FU: FnOnce(&K, &mut A, &mut V),
{
    fn make(&mut self, key: &K) -> V {
        let make_fn = self.make_fn.take().expect("make closure consumed twice");
        make_fn(key, &mut self.arg)
    }

    fn resolve(&mut self, key: &K, existing: &mut V) -> TreeResult<()> {
        let update_fn = self.update_fn.take().expect("update closure consumed twice");
        update_fn(key, &mut self.arg, existing);
        Ok(())
    }
}

// ============================================================================
// PUBLIC INSERT OPERATIONS
// ============================================================================

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Insert a key-value pair; fails with `DuplicateKey` when the key is
    /// already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::{BPlusTreeMap, TreeError};
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(1, "one").unwrap();
    /// assert_eq!(tree.insert(1, "uno"), Err(TreeError::DuplicateKey));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> TreeResult<()> {
        self.upsert(key, StrictPolicy { value: Some(value) })
            .map(|_| ())
    }

    /// Insert if the key is absent, keeping the existing value otherwise.
    /// Returns true iff a new key was inserted.
    pub fn try_insert(&mut self, key: K, value: V) -> bool {
        matches!(
            self.upsert(key, KeepPolicy { value: Some(value) }),
            Ok(true)
        )
    }

    /// Insert or overwrite. Returns true iff a new key was inserted.
    pub fn insert_or_replace(&mut self, key: K, value: V) -> bool {
        matches!(
            self.upsert(key, ReplacePolicy { value: Some(value) }),
            Ok(true)
        )
    }

    /// Insert or merge into the existing value in place.
    /// `merge(&key, &mut existing, new)` runs only on a duplicate.
    /// Returns true iff a new key was inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(2, 5).unwrap();
    /// let added = tree.insert_or_update(2, 20, |_, old, new| *old += new);
    /// assert!(!added);
    /// assert_eq!(tree.get(&2), Some(&25));
    /// ```
    pub fn insert_or_update<F>(&mut self, key: K, value: V, merge: F) -> bool
    where
        F: FnOnce(&K, &mut V, V),
    {
        matches!(
            self.upsert(
                key,
                MergePolicy {
                    value: Some(value),
                    merge: Some(merge),
                },
            ),
            Ok(true)
        )
    }

    /// Insert with lazy value construction: `make(&key, &mut arg)` builds
    /// the value for a fresh key, `update(&key, &mut arg, &mut existing)`
    /// reconciles a duplicate. Returns true iff a new key was inserted.
    pub fn insert_or_update_with<A, FM, FU>(
        &mut self,
        key: K,
        arg: A,
        make: FM,
        update: FU,
    ) -> bool
    where
        FM: FnOnce(&K, &mut A) -> V,
        FU: FnOnce(&K, &mut A, &mut V),
    {
        matches!(
            self.upsert(
                key,
                WithArgPolicy {
                    arg,
                    make_fn: Some(make),
                    update_fn: Some(update),
                },
            ),
            Ok(true)
        )
    }
}

// ============================================================================
// UPSERT PATH
// ============================================================================

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// The single insert path. Returns whether a new key was inserted.
    fn upsert<P: UpsertPolicy<K, V>>(&mut self, key: K, mut policy: P) -> TreeResult<bool> {
        // First entry: allocate the root leaf.
        let Some(root) = self.root else {
            let value = policy.make(&key);
            let mut leaf = LeafNode::new(self.leaf_cap);
            leaf.entries.push_last(Entry { key, value });
            let id = self.leaves.allocate(leaf);
            self.root = Some(NodeRef::Leaf(id));
            self.head = id;
            self.tail = id;
            self.height = 1;
            self.len = 1;
            self.version += 1;
            return Ok(true);
        };

        // Append fast path against the tail leaf.
        let tail_id = self.tail;
        let (tail_cmp, tail_full, tail_len) = {
            let tail = self.leaf(tail_id);
            match tail.last_key() {
                Some(last) => (Some(key.cmp(last)), tail.is_full(), tail.len()),
                None => (None, false, 0),
            }
        };
        match tail_cmp {
            Some(Ordering::Greater) if !tail_full => {
                let value = policy.make(&key);
                self.leaf_mut(tail_id).entries.push_last(Entry { key, value });
                self.len += 1;
                self.version += 1;
                return Ok(true);
            }
            Some(Ordering::Equal) => {
                let entry = self
                    .leaf_mut(tail_id)
                    .entries
                    .get_mut(tail_len - 1)
                    .expect("tail leaf is non-empty");
                policy.resolve(&key, &mut entry.value)?;
                self.version += 1;
                return Ok(false);
            }
            _ => {}
        }

        // Prepend fast path against the head leaf.
        let head_id = self.head;
        let (head_cmp, head_full) = {
            let head = self.leaf(head_id);
            match head.first_key() {
                Some(first) => (Some(key.cmp(first)), head.is_full()),
                None => (None, false),
            }
        };
        match head_cmp {
            Some(Ordering::Less) if !head_full => {
                let value = policy.make(&key);
                self.leaf_mut(head_id)
                    .entries
                    .push_first(Entry { key, value });
                self.len += 1;
                self.version += 1;
                return Ok(true);
            }
            Some(Ordering::Equal) => {
                let entry = self
                    .leaf_mut(head_id)
                    .entries
                    .get_mut(0)
                    .expect("head leaf is non-empty");
                policy.resolve(&key, &mut entry.value)?;
                self.version += 1;
                return Ok(false);
            }
            _ => {}
        }

        // Full descent from the root.
        let mut args = UpsertArgs {
            key,
            policy,
            added: false,
        };
        let outcome = match root {
            NodeRef::Leaf(id) => self.leaf_upsert(id, &mut args, Relatives::root())?,
            NodeRef::Branch(id) => self.branch_upsert(id, &mut args, Relatives::root())?,
        };

        // A promotion out of the root grows the tree by one level.
        if let InsertOutcome::Split { sep, right } = outcome {
            let mut new_root = BranchNode::new(self.branch_cap, root);
            new_root.seps.push_last(Separator { key: sep, right });
            let id = self.branches.allocate(new_root);
            self.root = Some(NodeRef::Branch(id));
            self.height += 1;
        }

        // The tail advances when the tail leaf split.
        let tail_next = self.leaf(self.tail).next;
        if tail_next != NULL_NODE {
            self.tail = tail_next;
        }

        if args.added {
            self.len += 1;
        }
        self.version += 1;
        Ok(args.added)
    }

    /// Insert into the subtree rooted at leaf `id`.
    fn leaf_upsert<P: UpsertPolicy<K, V>>(
        &mut self,
        id: NodeId,
        args: &mut UpsertArgs<K, P>,
        rel: Relatives,
    ) -> TreeResult<InsertOutcome<K>> {
        let position = self.leaf(id).find(&args.key);

        // Duplicate: resolve against the existing value in place.
        if let Ok(index) = position {
            let entry = self
                .leaf_mut(id)
                .entries
                .get_mut(index)
                .expect("found entry index is valid");
            args.policy.resolve(&args.key, &mut entry.value)?;
            args.added = false;
            return Ok(InsertOutcome::Done);
        }

        let index = position.unwrap_err();
        let value = args.policy.make(&args.key);
        let entry = Entry {
            key: args.key.clone(),
            value,
        };
        args.added = true;

        // Room in this leaf.
        if !self.leaf(id).is_full() {
            self.leaf_mut(id).entries.insert(index, entry);
            return Ok(InsertOutcome::Done);
        }

        // Spill one entry into the previous leaf; the separator dividing us
        // from it follows our new first key.
        if let Some((anc_id, anc_index)) = rel.left_ancestor {
            let prev = self.leaf(id).prev;
            if prev != NULL_NODE && !self.leaf(prev).is_full() {
                let displaced = self.leaf_mut(id).entries.insert_pop_first(index, entry);
                self.leaf_mut(prev).entries.push_last(displaced);
                let new_first = self
                    .leaf(id)
                    .first_key()
                    .expect("leaf is non-empty after spill")
                    .clone();
                self.set_separator_key(anc_id, anc_index, new_first);
                return Ok(InsertOutcome::Done);
            }
        }

        // Spill one entry into the next leaf; the separator dividing us from
        // it follows that leaf's new first key.
        if let Some((anc_id, anc_index)) = rel.right_ancestor {
            let next = self.leaf(id).next;
            if next != NULL_NODE && !self.leaf(next).is_full() {
                let displaced = self.leaf_mut(id).entries.insert_pop_last(index, entry);
                self.leaf_mut(next).entries.push_first(displaced);
                let new_first = self
                    .leaf(next)
                    .first_key()
                    .expect("leaf is non-empty after spill")
                    .clone();
                self.set_separator_key(anc_id, anc_index, new_first);
                return Ok(InsertOutcome::Done);
            }
        }

        // Split. The new entry goes to whichever half owns its index; a
        // boundary index lands at the right half's front so the halves
        // differ by at most one.
        let mut right_leaf = self.leaf_mut(id).split();
        let left_len = self.leaf(id).len();
        if index < left_len {
            if self.leaf(id).is_full() {
                // Capacity-one leaves keep nothing in the right half; shift
                // the boundary entry over to make room.
                let moved = self
                    .leaf_mut(id)
                    .entries
                    .pop_last()
                    .expect("left half is non-empty");
                right_leaf.entries.push_first(moved);
            }
            self.leaf_mut(id).entries.insert(index, entry);
        } else {
            right_leaf.entries.insert(index - left_len, entry);
        }

        let sep_key = right_leaf
            .first_key()
            .expect("right half is non-empty")
            .clone();

        // Rewire the chain around the new right leaf.
        let old_next = self.leaf(id).next;
        right_leaf.prev = id;
        right_leaf.next = old_next;
        let right_id = self.leaves.allocate(right_leaf);
        self.leaf_mut(id).next = right_id;
        if old_next != NULL_NODE {
            self.leaf_mut(old_next).prev = right_id;
        }

        Ok(InsertOutcome::Split {
            sep: sep_key,
            right: NodeRef::Leaf(right_id),
        })
    }

    /// Insert into the subtree rooted at branch `id`.
    fn branch_upsert<P: UpsertPolicy<K, V>>(
        &mut self,
        id: NodeId,
        args: &mut UpsertArgs<K, P>,
        rel: Relatives,
    ) -> TreeResult<InsertOutcome<K>> {
        let position = self.branch(id).find_child_position(&args.key);
        let child = self.branch(id).child_at(position);
        let child_rel = self.child_relatives(id, position, &rel);

        let outcome = match child {
            NodeRef::Leaf(leaf_id) => self.leaf_upsert(leaf_id, args, child_rel)?,
            NodeRef::Branch(branch_id) => self.branch_upsert(branch_id, args, child_rel)?,
        };
        let InsertOutcome::Split { sep, right } = outcome else {
            return Ok(InsertOutcome::Done);
        };
        let item = Separator { key: sep, right };

        // Room in this branch.
        if !self.branch(id).is_full() {
            self.branch_mut(id).seps.insert(position, item);
            return Ok(InsertOutcome::Done);
        }

        // Spill into the left sibling (true or cousin). The displaced first
        // separator rotates through the shared ancestor: its child swaps
        // with our `left`, its key swaps with the ancestor separator key.
        if let (Some(NodeRef::Branch(left_id)), Some((anc_id, anc_index))) =
            (rel.left, rel.left_ancestor)
        {
            if !self.branch(left_id).is_full() {
                let mut displaced = self.branch_mut(id).seps.insert_pop_first(position, item);
                let old_left = self.branch(id).left;
                self.branch_mut(id).left = displaced.right;
                displaced.right = old_left;
                displaced.key = self.swap_separator_key(anc_id, anc_index, displaced.key);
                self.branch_mut(left_id).seps.push_last(displaced);
                return Ok(InsertOutcome::Done);
            }
        }

        // Spill into the right sibling, rotating through its `left` slot and
        // the right ancestor key.
        if let (Some(NodeRef::Branch(right_id)), Some((anc_id, anc_index))) =
            (rel.right, rel.right_ancestor)
        {
            if !self.branch(right_id).is_full() {
                let mut displaced = self.branch_mut(id).seps.insert_pop_last(position, item);
                let old_right_left = self.branch(right_id).left;
                self.branch_mut(right_id).left = displaced.right;
                displaced.right = old_right_left;
                displaced.key = self.swap_separator_key(anc_id, anc_index, displaced.key);
                self.branch_mut(right_id).seps.push_first(displaced);
                return Ok(InsertOutcome::Done);
            }
        }

        // Split. The displaced middle separator is promoted: its child
        // becomes the new branch's `left`.
        let mut right_ring = self.branch_mut(id).seps.split_right();
        let left_len = self.branch(id).len();
        let middle = if position <= left_len {
            let seps = &mut self.branch_mut(id).seps;
            seps.insert(position, item);
            seps.pop_last().expect("left half is non-empty")
        } else {
            right_ring.insert(position - left_len, item);
            right_ring.pop_first().expect("right half is non-empty")
        };

        let new_branch = BranchNode {
            left: middle.right,
            seps: right_ring,
        };
        let new_id = self.branches.allocate(new_branch);
        Ok(InsertOutcome::Split {
            sep: middle.key,
            right: NodeRef::Branch(new_id),
        })
    }
}
