//! Sparse array: a multi-value map over the core tree.
//!
//! Each key owns an ordered group of values (`Vec<V>`), composed through
//! the tree's lazy upsert seam: the first push creates a one-element group,
//! later pushes append to it.

use crate::error::InitResult;
use crate::types::BPlusTreeMap;

/// Ordered multi-value map: any number of values per key, grouped in
/// insertion order.
///
/// # Examples
///
/// ```
/// use bptree::SparseArray;
///
/// let mut sparse = SparseArray::new(16).unwrap();
/// sparse.push(7, "a");
/// sparse.push(7, "b");
/// sparse.push(3, "c");
///
/// assert_eq!(sparse.get(&7), Some(&["a", "b"][..]));
/// assert_eq!(sparse.len(), 3);
/// assert_eq!(sparse.key_count(), 2);
/// ```
pub struct SparseArray<K, V> {
    tree: BPlusTreeMap<K, Vec<V>>,
    len: usize,
}

impl<K: Ord + Clone, V> SparseArray<K, V> {
    /// Create a sparse array using `capacity` for both node kinds of the
    /// underlying tree.
    pub fn new(capacity: usize) -> InitResult<Self> {
        Ok(Self {
            tree: BPlusTreeMap::new(capacity)?,
            len: 0,
        })
    }

    /// Create a sparse array with distinct leaf and branch capacities.
    pub fn with_capacities(leaf_cap: usize, branch_cap: usize) -> InitResult<Self> {
        Ok(Self {
            tree: BPlusTreeMap::with_capacities(leaf_cap, branch_cap)?,
            len: 0,
        })
    }

    /// Append `value` to the group at `key`, creating the group on first
    /// use.
    pub fn push(&mut self, key: K, value: V) {
        self.tree.insert_or_update_with(
            key,
            Some(value),
            |_, arg| vec![arg.take().expect("value consumed twice")],
            |_, arg, group| group.push(arg.take().expect("value consumed twice")),
        );
        self.len += 1;
    }

    /// The group at `key`, in insertion order.
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.tree.get(key).map(Vec::as_slice)
    }

    /// Returns true if `key` has at least one value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Remove and return the whole group at `key`.
    pub fn remove_key(&mut self, key: &K) -> Option<Vec<V>> {
        let group = self.tree.remove(key)?;
        self.len -= group.len();
        Some(group)
    }

    /// Total number of values across all groups.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate `(key, group)` pairs in key order.
    pub fn groups(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.tree.items().map(|(key, group)| (key, group.as_slice()))
    }

    /// Iterate every `(key, value)` pair: key order, then insertion order
    /// within a group.
    pub fn items(&self) -> impl Iterator<Item = (&K, &V)> {
        self.tree
            .items()
            .flat_map(|(key, group)| group.iter().map(move |value| (key, value)))
    }

    /// Drop all groups.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_groups_values_per_key() {
        let mut sparse = SparseArray::new(4).unwrap();
        sparse.push(1, "a");
        sparse.push(2, "b");
        sparse.push(1, "c");
        assert_eq!(sparse.get(&1), Some(&["a", "c"][..]));
        assert_eq!(sparse.get(&2), Some(&["b"][..]));
        assert_eq!(sparse.len(), 3);
        assert_eq!(sparse.key_count(), 2);
    }

    #[test]
    fn remove_key_drops_whole_group() {
        let mut sparse = SparseArray::new(4).unwrap();
        sparse.push(1, 10);
        sparse.push(1, 11);
        sparse.push(2, 20);
        assert_eq!(sparse.remove_key(&1), Some(vec![10, 11]));
        assert_eq!(sparse.len(), 1);
        assert!(!sparse.contains_key(&1));
    }

    #[test]
    fn flattened_iteration_preserves_both_orders() {
        let mut sparse = SparseArray::new(4).unwrap();
        sparse.push(2, "x");
        sparse.push(1, "y");
        sparse.push(2, "z");
        let flat: Vec<_> = sparse.items().collect();
        assert_eq!(flat, [(&1, &"y"), (&2, &"x"), (&2, &"z")]);
    }
}
