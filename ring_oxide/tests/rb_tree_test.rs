//! Red-black tree tests
//!
//! The coloring sequence below is the classic CLRS insertion example; each
//! removal step asserts the exact in-order colors so a fix-up regression is
//! caught at the step that introduced it. Property tests re-verify the five
//! invariants after random operation sequences.

use proptest::prelude::*;
use ring_oxide::index::Color::{Black, Red};
use ring_oxide::index::{RbTree, SuccessorIndex};
use std::collections::BTreeMap;

// ============================================================================
// Basic operations
// ============================================================================

#[test]
fn test_empty_tree() {
    let tree = RbTree::new();
    assert_eq!(tree.len(), 0);
    assert!(tree.keys_in_order().is_empty());
    assert_eq!(tree.root_key(), None);
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn test_insert_one() {
    let mut tree = RbTree::new();
    assert!(tree.insert(1, 0));
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.keys_in_order(), vec![1]);
    assert_eq!(tree.colors_in_order(), vec![Black]);
}

#[test]
fn test_query() {
    let mut tree = RbTree::new();
    for key in [11u64, 2, 14, 15, 1, 7, 5, 8, 4] {
        tree.insert(key, 0);
    }
    assert_eq!(tree.len(), 9);
    for key in [11u64, 2, 14, 15, 1, 7, 5, 8, 4] {
        assert!(tree.contains(key));
    }
    assert!(!tree.contains(0));
    assert!(!tree.contains(3));
    assert!(!tree.contains(12));
}

// ============================================================================
// Coloring
// ============================================================================

#[test]
fn test_insert_coloring() {
    let mut tree = RbTree::new();
    for key in [11u64, 2, 14, 15, 1, 7, 5, 8, 4] {
        assert!(tree.insert(key, 0));
    }
    assert_eq!(tree.len(), 9);
    assert_eq!(tree.root_key(), Some(7));
    assert_eq!(tree.keys_in_order(), vec![1, 2, 4, 5, 7, 8, 11, 14, 15]);
    assert_eq!(
        tree.colors_in_order(),
        vec![Black, Red, Red, Black, Black, Black, Red, Black, Red]
    );
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn test_removal_coloring() {
    let mut tree = RbTree::new();
    for key in [11u64, 2, 14, 15, 1, 7, 5, 8, 4] {
        tree.insert(key, 0);
    }

    tree.remove(15);
    assert_eq!(tree.len(), 8);
    assert_eq!(
        tree.colors_in_order(),
        vec![Black, Red, Red, Black, Black, Black, Red, Black]
    );
    assert!(tree.check_invariants().is_ok());

    tree.remove(4);
    assert_eq!(tree.len(), 7);
    assert_eq!(
        tree.colors_in_order(),
        vec![Black, Red, Black, Black, Black, Red, Black]
    );
    assert!(tree.check_invariants().is_ok());

    tree.remove(1);
    assert_eq!(tree.len(), 6);
    assert_eq!(
        tree.colors_in_order(),
        vec![Black, Red, Black, Black, Red, Black]
    );
    assert!(tree.check_invariants().is_ok());

    tree.remove(11);
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.colors_in_order(), vec![Black, Red, Black, Red, Black]);
    assert!(tree.check_invariants().is_ok());

    tree.remove(7);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.root_key(), Some(8));
    assert_eq!(tree.colors_in_order(), vec![Black, Red, Black, Black]);
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn test_remove_nonexistent() {
    let mut tree = RbTree::new();
    assert!(!tree.remove(0));
    tree.insert(1, 0);
    assert!(!tree.remove(2));
    assert_eq!(tree.len(), 1);
}

// ============================================================================
// Successor queries
// ============================================================================

#[test]
fn test_successor_wraps_to_min() {
    let mut tree = RbTree::new();
    for key in [10u64, 20, 30] {
        tree.insert(key, 0);
    }
    assert_eq!(tree.successor(5), Some(10));
    assert_eq!(tree.successor(20), Some(30));
    assert_eq!(tree.successor(30), Some(10));
    assert_eq!(tree.min_key(), Some(10));
}

// ============================================================================
// Properties
// ============================================================================

fn reference_successor(map: &BTreeMap<u64, usize>, position: u64) -> Option<u64> {
    map.range(position + 1..)
        .next()
        .or_else(|| map.iter().next())
        .map(|(&k, _)| k)
}

proptest! {
    #[test]
    fn prop_invariants_hold_after_random_ops(
        ops in prop::collection::vec((any::<bool>(), 0u64..64), 1..200)
    ) {
        let mut tree = RbTree::new();
        let mut reference = BTreeMap::new();

        for (is_insert, key) in ops {
            if is_insert {
                let expected = !reference.contains_key(&key);
                prop_assert_eq!(tree.insert(key, key as usize), expected);
                reference.entry(key).or_insert(key as usize);
            } else {
                let expected = reference.remove(&key).is_some();
                prop_assert_eq!(tree.remove(key), expected);
            }
            prop_assert!(tree.check_invariants().is_ok(), "invariants broken");
        }

        prop_assert_eq!(
            tree.keys_in_order(),
            reference.keys().copied().collect::<Vec<u64>>()
        );
    }

    #[test]
    fn prop_successor_matches_reference(
        keys in prop::collection::btree_set(0u64..256, 1..64),
        probes in prop::collection::vec(0u64..256, 20)
    ) {
        let mut tree = RbTree::new();
        let mut reference = BTreeMap::new();
        for &key in &keys {
            tree.insert(key, 0);
            reference.insert(key, 0);
        }
        for probe in probes {
            prop_assert_eq!(tree.successor(probe), reference_successor(&reference, probe));
        }
    }
}
