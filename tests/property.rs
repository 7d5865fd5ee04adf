// =====================================================================
// File: property.rs
// Author: Bob Jack
// Date: Oct. 10, 2025
//
// Description:
//   Property-based and randomized tests for the B-tree index. Every
//   run is compared against `std::collections::BTreeMap` as an oracle
//   and the structural invariants are checked along the way.
//
//   - Round trip: inserted keys map to their first value
//   - Deletion: deleted keys are gone, the rest are unchanged
//   - Sorted traversal for any mix of inserts and deletes
// =====================================================================
use std::collections::BTreeMap;

use btree_index::BTreeIndex;
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

/// Operations that can be performed on the tree
#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u32),
    Delete(u16),
    Search(u16),
}

/// Generate a sequence of random operations over a small key space so
/// deletes and duplicate inserts actually hit.
fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0u16..300, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => (0u16..300).prop_map(Op::Delete),
            1 => (0u16..300).prop_map(Op::Search),
        ],
        0..max_ops,
    )
}


proptest! {
    /// Property: after inserting a set of pairs, every key maps to the
    /// value of its first insert.
    #[test]
    fn prop_insert_then_search(
        degree in 2usize..7,
        pairs in prop::collection::vec((any::<i32>(), any::<i32>()), 0..400),
    ) {
        let mut tree = BTreeIndex::new(degree).unwrap();
        let mut oracle = BTreeMap::new();

        for (k, v) in pairs {
            let fresh = !oracle.contains_key(&k);
            if fresh {
                oracle.insert(k, v);
            }
            prop_assert_eq!(tree.insert(k, v), fresh);
        }

        prop_assert!(tree.validate().is_ok());
        prop_assert_eq!(tree.len(), oracle.len());
        for (k, v) in &oracle {
            prop_assert_eq!(tree.search(k), Some(v));
        }
    }

    /// Property: any mix of operations behaves like the oracle and
    /// keeps every invariant after every step.
    #[test]
    fn prop_matches_oracle(degree in 2usize..6, ops in operations(500)) {
        let mut tree = BTreeIndex::new(degree).unwrap();
        let mut oracle: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let fresh = !oracle.contains_key(&k);
                    if fresh {
                        oracle.insert(k, v);
                    }
                    prop_assert_eq!(tree.insert(k, v), fresh);
                }
                Op::Delete(k) => {
                    prop_assert_eq!(tree.delete(&k), oracle.remove(&k).is_some());
                    prop_assert_eq!(tree.search(&k), None);
                }
                Op::Search(k) => {
                    prop_assert_eq!(tree.search(&k), oracle.get(&k));
                }
            }
            if let Err(e) = tree.validate() {
                return Err(TestCaseError::fail(e.to_string()));
            }
        }

        prop_assert_eq!(tree.keys(), oracle.keys().copied().collect::<Vec<_>>());
    }

    /// Property: deleting everything, in any order, empties the tree.
    #[test]
    fn prop_delete_all_empties(
        degree in 2usize..6,
        keys in prop::collection::hash_set(any::<i64>(), 1..300),
        seed in any::<u64>(),
    ) {
        let mut tree = BTreeIndex::new(degree).unwrap();
        for &k in &keys {
            tree.insert(k, ());
        }

        let mut order: Vec<i64> = keys.into_iter().collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        for k in &order {
            prop_assert!(tree.delete(k));
            prop_assert!(!tree.delete(k));
        }

        prop_assert!(tree.is_empty());
        prop_assert!(tree.root().is_none());
    }
}


// ===========================================================================
// Randomized stress with invariant checks
// ===========================================================================

#[test]
fn random_workload_keeps_invariants() {
    let mut rng = StdRng::seed_from_u64(0xB7EE);

    for degree in [2, 3, 4, 8] {
        let mut tree = BTreeIndex::new(degree).unwrap();
        let mut oracle = BTreeMap::new();

        for step in 0..5_000 {
            let key: u32 = rng.gen_range(0..1_000);
            if rng.gen_bool(0.55) {
                let value: u64 = rng.r#gen();
                if !oracle.contains_key(&key) {
                    oracle.insert(key, value);
                }
                tree.insert(key, value);
            } else {
                assert_eq!(
                    tree.remove(&key),
                    oracle.remove(&key),
                    "degree {degree}, step {step}, key {key}"
                );
            }

            if step % 50 == 0 {
                tree.assert_invariants();
            }
        }

        tree.assert_invariants();
        assert_eq!(tree.len(), oracle.len());
        assert_eq!(tree.keys(), oracle.keys().copied().collect::<Vec<_>>());
        for (k, v) in &oracle {
            assert_eq!(tree.search(k), Some(v));
        }
    }
}


#[test]
fn grow_and_drain_repeatedly() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree = BTreeIndex::new(3).unwrap();

    for round in 0..5 {
        let mut keys: Vec<u32> = (0..1_000).collect();
        keys.shuffle(&mut rng);
        for &k in &keys {
            tree.insert(k, round);
        }
        assert_eq!(tree.len(), 1_000);
        tree.assert_invariants();

        keys.shuffle(&mut rng);
        for &k in &keys {
            assert_eq!(tree.remove(&k), Some(round));
        }
        assert!(tree.is_empty());
    }
}
