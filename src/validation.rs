//! Validation and debugging utilities.
//!
//! [`BPlusTreeMap::check_invariants`] verifies the full structural contract:
//! routing bounds, fill, uniform leaf depth, leaf-chain integrity, entry
//! count, and arena-tree consistency. The test suites call it after every
//! mutation step; it is not needed on the hot paths.

use crate::types::{BPlusTreeMap, NodeId, NodeRef, NULL_NODE};

/// Aggregates gathered during the structural walk.
struct WalkStats {
    leaf_ids: Vec<NodeId>,
    branch_count: usize,
    entry_count: usize,
    leaf_depth: Option<usize>,
}

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Check every tree invariant, returning a description of the first
    /// violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let Some(root) = self.root else {
            if self.len != 0 {
                return Err(format!("empty tree reports {} entries", self.len));
            }
            if self.head != NULL_NODE || self.tail != NULL_NODE {
                return Err("empty tree still has chain ends".to_string());
            }
            if self.height != 0 {
                return Err(format!("empty tree has height {}", self.height));
            }
            if self.leaves.allocated_count() != 0 || self.branches.allocated_count() != 0 {
                return Err("empty tree still owns arena nodes".to_string());
            }
            return Ok(());
        };

        let mut stats = WalkStats {
            leaf_ids: Vec::new(),
            branch_count: 0,
            entry_count: 0,
            leaf_depth: None,
        };
        self.check_node(root, 0, None, None, true, &mut stats)?;

        if let Some(depth) = stats.leaf_depth {
            if depth + 1 != self.height {
                return Err(format!(
                    "leaf depth {} does not match height {}",
                    depth, self.height
                ));
            }
        }
        if stats.entry_count != self.len {
            return Err(format!(
                "tree holds {} entries but reports {}",
                stats.entry_count, self.len
            ));
        }

        self.check_chain(&stats.leaf_ids)?;

        // Arena-tree consistency: every allocated node is reachable.
        if stats.leaf_ids.len() != self.leaves.allocated_count() {
            return Err(format!(
                "{} leaves in tree vs {} allocated in arena",
                stats.leaf_ids.len(),
                self.leaves.allocated_count()
            ));
        }
        if stats.branch_count != self.branches.allocated_count() {
            return Err(format!(
                "{} branches in tree vs {} allocated in arena",
                stats.branch_count,
                self.branches.allocated_count()
            ));
        }

        Ok(())
    }

    /// Walk the subtree at `node`, checking key bounds (`lower` inclusive,
    /// `upper` exclusive), fill, and depth uniformity.
    fn check_node(
        &self,
        node: NodeRef,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        is_root: bool,
        stats: &mut WalkStats,
    ) -> Result<(), String> {
        match node {
            NodeRef::Leaf(id) => {
                let leaf = self
                    .get_leaf(id)
                    .ok_or_else(|| format!("dangling leaf id {}", id))?;

                match stats.leaf_depth {
                    None => stats.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(format!(
                            "leaf {} at depth {} but expected {}",
                            id, depth, expected
                        ))
                    }
                    _ => {}
                }

                if !is_root && !leaf.is_half_full() {
                    return Err(format!(
                        "leaf {} holds {} entries, below the half-full bound {}",
                        id,
                        leaf.len(),
                        leaf.min_len()
                    ));
                }
                if is_root && leaf.is_empty() {
                    return Err(format!("root leaf {} is empty", id));
                }

                let mut previous: Option<&K> = None;
                for (index, entry) in leaf.entries.iter().enumerate() {
                    if let Some(prev_key) = previous {
                        if prev_key >= &entry.key {
                            return Err(format!(
                                "leaf {} keys out of order at index {}",
                                id, index
                            ));
                        }
                    }
                    if let Some(low) = lower {
                        if &entry.key < low {
                            return Err(format!(
                                "leaf {} key at index {} below its subtree bound",
                                id, index
                            ));
                        }
                    }
                    if let Some(high) = upper {
                        if &entry.key >= high {
                            return Err(format!(
                                "leaf {} key at index {} reaches its upper bound",
                                id, index
                            ));
                        }
                    }
                    previous = Some(&entry.key);
                }

                stats.entry_count += leaf.len();
                stats.leaf_ids.push(id);
                Ok(())
            }
            NodeRef::Branch(id) => {
                let branch = self
                    .get_branch(id)
                    .ok_or_else(|| format!("dangling branch id {}", id))?;
                stats.branch_count += 1;

                if branch.is_empty() {
                    return Err(format!("branch {} has no separators", id));
                }
                if !is_root && !branch.is_half_full() {
                    return Err(format!(
                        "branch {} holds {} separators, below the half-full bound {}",
                        id,
                        branch.len(),
                        branch.min_len()
                    ));
                }

                // Separator keys strictly increase and stay within bounds.
                let mut previous: Option<&K> = None;
                for (index, sep) in branch.seps.iter().enumerate() {
                    if let Some(prev_key) = previous {
                        if prev_key >= &sep.key {
                            return Err(format!(
                                "branch {} separators out of order at index {}",
                                id, index
                            ));
                        }
                    }
                    if let Some(low) = lower {
                        if &sep.key < low {
                            return Err(format!(
                                "branch {} separator {} below its subtree bound",
                                id, index
                            ));
                        }
                    }
                    if let Some(high) = upper {
                        if &sep.key >= high {
                            return Err(format!(
                                "branch {} separator {} reaches its upper bound",
                                id, index
                            ));
                        }
                    }
                    previous = Some(&sep.key);
                }

                // Recurse with the routing bounds each child must satisfy.
                let first_upper = branch.seps.first().map(|sep| &sep.key);
                self.check_node(branch.left, depth + 1, lower, first_upper, false, stats)?;
                for index in 0..branch.len() {
                    let sep = branch.seps.get(index).expect("separator index is valid");
                    let child_upper = branch.seps.get(index + 1).map(|next| &next.key).or(upper);
                    self.check_node(
                        sep.right,
                        depth + 1,
                        Some(&sep.key),
                        child_upper,
                        false,
                        stats,
                    )?;
                }
                Ok(())
            }
        }
    }

    /// Check the leaf chain against the set of leaves found by the
    /// structural walk: symmetry of `prev`/`next`, chain ends, and
    /// completeness.
    fn check_chain(&self, walked_leaves: &[NodeId]) -> Result<(), String> {
        let Some(head_id) = self.first_leaf_id() else {
            return Err("non-empty tree has no head leaf".to_string());
        };

        let mut chain = Vec::new();
        let mut previous = NULL_NODE;
        let mut current = head_id;
        loop {
            let leaf = self
                .get_leaf(current)
                .ok_or_else(|| format!("chain reaches dangling leaf id {}", current))?;
            if leaf.prev != previous {
                return Err(format!(
                    "leaf {} prev link {} does not match predecessor {}",
                    current, leaf.prev, previous
                ));
            }
            chain.push(current);
            if leaf.next == NULL_NODE {
                break;
            }
            previous = current;
            current = leaf.next;
            if chain.len() > walked_leaves.len() {
                return Err("leaf chain is longer than the tree".to_string());
            }
        }

        if current != self.tail {
            return Err(format!(
                "chain ends at leaf {} but tail is {}",
                current, self.tail
            ));
        }

        // The chain must visit exactly the leaves the root reaches, in
        // order: the structural walk is left-to-right, so the sequences
        // must match element for element.
        if chain != walked_leaves {
            return Err("leaf chain does not match the in-order leaf sequence".to_string());
        }

        Ok(())
    }
}
