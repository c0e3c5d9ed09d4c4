//! Randomized differential testing against `std::collections::BTreeMap`.
//!
//! The standard map is the reference model: after every batch of random
//! operations both containers must agree on content and iteration order,
//! and the tree must pass its own invariant checker. Seeds are fixed so
//! failures reproduce.

use std::collections::BTreeMap;

use bptree::BPlusTreeMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn assert_matches_model(tree: &BPlusTreeMap<i32, i32>, model: &BTreeMap<i32, i32>) {
    assert_eq!(tree.len(), model.len());
    let tree_items: Vec<_> = tree.items().map(|(k, v)| (*k, *v)).collect();
    let model_items: Vec<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(tree_items, model_items);
    tree.check_invariants().unwrap();
}

#[test]
fn random_insert_remove_agrees_with_btreemap() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for &(leaf, branch) in &[(3usize, 3usize), (4, 4), (16, 16)] {
        let mut tree = BPlusTreeMap::with_capacities(leaf, branch).unwrap();
        let mut model = BTreeMap::new();

        for step in 0..4000 {
            let key = rng.gen_range(0..600);
            if rng.gen_bool(0.6) {
                let value = rng.gen_range(0..10_000);
                tree.insert_or_replace(key, value);
                model.insert(key, value);
            } else {
                assert_eq!(tree.remove(&key), model.remove(&key));
            }

            if step % 250 == 0 {
                assert_matches_model(&tree, &model);
            }
        }
        assert_matches_model(&tree, &model);
    }
}

#[test]
fn random_lookups_agree_with_btreemap() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut tree = BPlusTreeMap::with_capacities(4, 4).unwrap();
    let mut model = BTreeMap::new();

    for _ in 0..2000 {
        let key = rng.gen_range(0..400);
        let value = rng.gen_range(0..10_000);
        tree.insert_or_replace(key, value);
        model.insert(key, value);
    }

    for probe in -10..410 {
        assert_eq!(tree.get(&probe), model.get(&probe));
        assert_eq!(tree.contains_key(&probe), model.contains_key(&probe));
    }

    assert_eq!(
        tree.first().ok().map(|(k, v)| (*k, *v)),
        model.first_key_value().map(|(k, v)| (*k, *v)),
    );
    assert_eq!(
        tree.last().ok().map(|(k, v)| (*k, *v)),
        model.last_key_value().map(|(k, v)| (*k, *v)),
    );
}

#[test]
fn random_seeded_ranges_agree_with_btreemap() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = BPlusTreeMap::with_capacities(3, 3).unwrap();
    let mut model = BTreeMap::new();

    for _ in 0..1500 {
        let key = rng.gen_range(0..500);
        tree.insert_or_replace(key, key);
        model.insert(key, key);
    }

    for _ in 0..100 {
        let start = rng.gen_range(-10..510);
        let forward: Vec<i32> = tree.items_from(&start).map(|(k, _)| *k).collect();
        let expected: Vec<i32> = model.range(start..).map(|(k, _)| *k).collect();
        assert_eq!(forward, expected, "forward from {}", start);

        let reverse: Vec<i32> = tree.items_rev_from(&start).map(|(k, _)| *k).collect();
        let expected: Vec<i32> = model.range(..=start).rev().map(|(k, _)| *k).collect();
        assert_eq!(reverse, expected, "reverse from {}", start);
    }
}

#[test]
fn random_update_policies_agree_with_btreemap() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut tree = BPlusTreeMap::with_capacities(3, 3).unwrap();
    let mut model: BTreeMap<i32, i32> = BTreeMap::new();

    for _ in 0..3000 {
        let key = rng.gen_range(0..200);
        let value = rng.gen_range(0..100);
        match rng.gen_range(0..3) {
            0 => {
                let added = tree.try_insert(key, value);
                let model_added = !model.contains_key(&key);
                if model_added {
                    model.insert(key, value);
                }
                assert_eq!(added, model_added);
            }
            1 => {
                tree.insert_or_replace(key, value);
                model.insert(key, value);
            }
            _ => {
                tree.insert_or_update(key, value, |_, old, new| *old += new);
                *model.entry(key).or_insert(0) += value;
            }
        }
    }
    assert_matches_model(&tree, &model);
}
