//! Read operations for the B+ tree.
//!
//! Point lookups descend the branch routing to a single leaf and
//! binary-search its ring. Edge reads (`first`/`last`) go straight to the
//! chain ends without touching the root.

use crate::error::{TreeError, TreeResult};
use crate::types::BPlusTreeMap;

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Get a reference to the value associated with a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(1, "one").unwrap();
    /// assert_eq!(tree.get(&1), Some(&"one"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let leaf = self.leaf(self.leaf_for(key)?);
        let index = leaf.find(key).ok()?;
        leaf.entry(index).map(|entry| &entry.value)
    }

    /// Get a mutable reference to the value associated with a key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let leaf_id = self.leaf_for(key)?;
        let index = self.leaf(leaf_id).find(key).ok()?;
        self.leaf_mut(leaf_id)
            .entries
            .get_mut(index)
            .map(|entry| &mut entry.value)
    }

    /// Check if a key exists in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Get the value for a key, failing with `KeyNotFound` when absent.
    pub fn try_get(&self, key: &K) -> TreeResult<&V> {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    /// Get the value for a key, or `default` when absent.
    pub fn get_or_default<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// The entry with the smallest key.
    ///
    /// Fails with `EmptyCollection` on an empty tree.
    pub fn first(&self) -> TreeResult<(&K, &V)> {
        let leaf = self.leaf(self.first_leaf_id().ok_or(TreeError::EmptyCollection)?);
        let entry = leaf.entry(0).ok_or(TreeError::EmptyCollection)?;
        Ok((&entry.key, &entry.value))
    }

    /// The entry with the largest key.
    ///
    /// Fails with `EmptyCollection` on an empty tree.
    pub fn last(&self) -> TreeResult<(&K, &V)> {
        let leaf = self.leaf(self.last_leaf_id().ok_or(TreeError::EmptyCollection)?);
        let entry = leaf
            .entry(leaf.len().saturating_sub(1))
            .ok_or(TreeError::EmptyCollection)?;
        Ok((&entry.key, &entry.value))
    }

    /// The value nearest to `key` from above within the leaf that would hold
    /// it: the exact match when present, otherwise the value at the
    /// insertion point, clamped to the leaf's last entry when the key sorts
    /// past the end.
    ///
    /// Fails with `EmptyCollection` on an empty tree.
    pub fn next_nearest(&self, key: &K) -> TreeResult<&V> {
        let leaf_id = self.leaf_for(key).ok_or(TreeError::EmptyCollection)?;
        let leaf = self.leaf(leaf_id);
        let index = match leaf.find(key) {
            Ok(index) => index,
            Err(insertion) => insertion.min(leaf.len().saturating_sub(1)),
        };
        leaf.entry(index)
            .map(|entry| &entry.value)
            .ok_or(TreeError::EmptyCollection)
    }
}

impl<K: Ord, V> std::ops::Index<&K> for BPlusTreeMap<K, V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found in tree")
    }
}
