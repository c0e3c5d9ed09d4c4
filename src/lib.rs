//! B+ tree map with ring-buffer nodes and a dict-like API.
//!
//! This crate provides an in-memory ordered associative container backed by
//! a B+ tree: all values live in leaf nodes chained in key order, node
//! payloads are circular buffers, and rebalancing prefers moving a single
//! element to a sibling (spill on insert, borrow on delete) over splitting
//! or merging. A bulk-loading [`TreeBuilder`] constructs a balanced tree in
//! O(n) from ordered input, and [`SparseArray`] layers a multi-value map on
//! top of the same core.
//!
//! # Examples
//!
//! ```
//! use bptree::BPlusTreeMap;
//!
//! let mut tree = BPlusTreeMap::new(16).unwrap();
//! tree.insert(1, "one").unwrap();
//! tree.insert(3, "three").unwrap();
//! tree.insert(2, "two").unwrap();
//!
//! assert_eq!(tree.get(&2), Some(&"two"));
//! assert_eq!(
//!     tree.items().map(|(k, _)| *k).collect::<Vec<_>>(),
//!     [1, 2, 3],
//! );
//!
//! // Range scans in either direction, seeded by a start key.
//! let back: Vec<_> = tree.items_rev_from(&2).map(|(k, _)| *k).collect();
//! assert_eq!(back, [2, 1]);
//! ```

mod arena;
mod builder;
mod construction;
mod delete_operations;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod node;
mod ring;
mod sparse;
mod tree_structure;
mod types;
mod validation;

pub use arena::{Arena, NodeId, NULL_NODE};
pub use builder::TreeBuilder;
pub use construction::DEFAULT_CAPACITY;
pub use error::{InitResult, TreeError, TreeResult};
pub use iteration::{Cursor, Iter, Keys, Values};
pub use ring::{RingArray, RingConstraint, RingCursor};
pub use sparse::SparseArray;
pub use types::{BPlusTreeMap, BranchNode, LeafNode, NodeRef};
