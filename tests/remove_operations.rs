//! Deletion scenarios: borrow-before-merge, chain splicing, root collapse.
//!
//! Invariants are checked after every single removal so a rebalancing bug
//! is caught at the step that introduced it.

use bptree::BPlusTreeMap;
use paste::paste;

fn filled(leaf_cap: usize, branch_cap: usize, n: i32) -> BPlusTreeMap<i32, i32> {
    let mut tree = BPlusTreeMap::with_capacities(leaf_cap, branch_cap).unwrap();
    for i in 1..=n {
        tree.insert(i, i * 10).unwrap();
    }
    tree.check_invariants().unwrap();
    tree
}

#[test]
fn mid_range_removal_rebalances_every_step() {
    let mut tree = filled(4, 4, 32);
    for key in [16, 17, 18, 19] {
        assert_eq!(tree.remove(&key), Some(key * 10));
        tree.check_invariants().unwrap();
    }
    assert_eq!(tree.len(), 28);
    let keys: Vec<i32> = tree.items().map(|(k, _)| *k).collect();
    let expected: Vec<i32> = (1..=32).filter(|k| !(16..=19).contains(k)).collect();
    assert_eq!(keys, expected);
}

#[test]
fn remove_missing_keys_changes_nothing() {
    let mut tree = filled(3, 3, 10);
    tree.insert(20, 200).unwrap();
    let version = tree.version();
    // Outside the occupied range on both sides, and a gap inside it.
    assert_eq!(tree.remove(&0), None);
    assert_eq!(tree.remove(&21), None);
    assert_eq!(tree.remove(&15), None);
    assert_eq!(tree.version(), version);
    assert_eq!(tree.len(), 11);
}

#[test]
fn drain_ascending_collapses_the_tree() {
    let mut tree = filled(3, 3, 50);
    for i in 1..=50 {
        assert_eq!(tree.remove(&i), Some(i * 10));
        tree.check_invariants().unwrap();
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.items().count(), 0);

    // The emptied tree accepts new entries.
    tree.insert(1, 10).unwrap();
    assert_eq!(tree.len(), 1);
    tree.check_invariants().unwrap();
}

#[test]
fn drain_descending_collapses_the_tree() {
    let mut tree = filled(3, 3, 50);
    for i in (1..=50).rev() {
        assert_eq!(tree.remove(&i), Some(i * 10));
        tree.check_invariants().unwrap();
    }
    assert!(tree.is_empty());
}

#[test]
fn drain_from_the_middle_out() {
    let mut tree = filled(4, 4, 64);
    let mut keys: Vec<i32> = (1..=64).collect();
    // Remove in an inside-out order to hit borrows from both directions.
    keys.sort_by_key(|k| (k - 32).abs());
    for key in keys {
        assert!(tree.remove(&key).is_some());
        tree.check_invariants().unwrap();
    }
    assert!(tree.is_empty());
}

#[test]
fn remove_first_and_last_walk_the_edges() {
    let mut tree = filled(3, 3, 20);
    assert_eq!(tree.remove_first(), Some((1, 10)));
    assert_eq!(tree.remove_last(), Some((20, 200)));
    tree.check_invariants().unwrap();

    // Alternate edges until empty.
    let mut low = 2;
    let mut high = 19;
    while !tree.is_empty() {
        let (k, _) = tree.remove_first().unwrap();
        assert_eq!(k, low);
        low += 1;
        tree.check_invariants().unwrap();
        if let Some((k, _)) = tree.remove_last() {
            assert_eq!(k, high);
            high -= 1;
            tree.check_invariants().unwrap();
        }
    }
    assert_eq!(tree.remove_first(), None);
    assert_eq!(tree.remove_last(), None);
}

#[test]
fn interleaved_insert_remove_churn() {
    let mut tree = BPlusTreeMap::with_capacities(3, 3).unwrap();
    for round in 0..10 {
        for i in 0..30 {
            tree.insert_or_replace(i * 10 + round, i);
        }
        tree.check_invariants().unwrap();
        for i in (0..30).step_by(2) {
            tree.remove(&(i * 10 + round));
            tree.check_invariants().unwrap();
        }
    }
    assert!(!tree.is_empty());
    let keys: Vec<i32> = tree.items().map(|(k, _)| *k).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(keys, sorted);
}

#[test]
fn single_leaf_tree_empties_cleanly() {
    let mut tree = BPlusTreeMap::with_capacities(4, 4).unwrap();
    tree.insert(1, "a").unwrap();
    tree.insert(2, "b").unwrap();
    assert_eq!(tree.remove(&1), Some("a"));
    tree.check_invariants().unwrap();
    assert_eq!(tree.remove(&2), Some("b"));
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    tree.check_invariants().unwrap();
}

// Capacity grid: the same removal sweep across node geometries, including
// the degenerate single-entry leaf.
macro_rules! removal_sweep {
    ($leaf:literal, $branch:literal) => {
        paste! {
            #[test]
            fn [<removal_sweep_leaf_ $leaf _branch_ $branch>]() {
                let mut tree = filled($leaf, $branch, 100);
                // Evens first, then odds, invariants at every step.
                for i in (2..=100).step_by(2) {
                    assert_eq!(tree.remove(&i), Some(i * 10));
                    tree.check_invariants().unwrap();
                }
                for i in (1..=99).step_by(2) {
                    assert_eq!(tree.remove(&i), Some(i * 10));
                    tree.check_invariants().unwrap();
                }
                assert!(tree.is_empty());
            }
        }
    };
}

removal_sweep!(1, 2);
removal_sweep!(2, 2);
removal_sweep!(3, 3);
removal_sweep!(4, 4);
removal_sweep!(7, 3);
removal_sweep!(16, 16);
