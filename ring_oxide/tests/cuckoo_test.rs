//! Cuckoo filter tests
//!
//! Covers the fingerprint/bucket arithmetic, removal duality, eviction-chain
//! saturation, and seeded determinism.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ring_oxide::membership::CuckooFilter;

// ============================================================================
// Basic operations
// ============================================================================

#[test]
fn test_fruit_basket() {
    let mut filter = CuckooFilter::with_seed(4, 100, 1, 500, 42).unwrap();

    assert!(filter.insert(b"apple"));
    assert!(filter.insert(b"banana"));
    assert!(filter.insert(b"cherry"));

    assert!(filter.contains(b"apple"));
    assert!(filter.contains(b"banana"));
    assert!(!filter.contains(b"grape"));

    assert!(filter.remove(b"banana"));
    assert!(!filter.contains(b"banana"));
}

#[test]
fn test_insert_one() {
    let mut filter = CuckooFilter::new(4, 250_000, 2, 500).unwrap();
    assert!(filter.insert(&2u32.to_le_bytes()));
    assert!(filter.contains(&2u32.to_le_bytes()));
}

#[test]
fn test_insert_multi() {
    let mut filter = CuckooFilter::new(4, 250_000, 2, 500).unwrap();
    let mut rng = StdRng::seed_from_u64(123);
    let values: Vec<u32> = (0..100_000).map(|_| rng.random_range(1..1_000_000)).collect();

    for val in &values {
        assert!(filter.insert(&val.to_le_bytes()), "insert failed for {val}");
    }
    for val in &values {
        assert!(
            filter.contains(&val.to_le_bytes()),
            "false negative for {val}"
        );
    }
}

// ============================================================================
// Removal duality
// ============================================================================

#[test]
fn test_remove_then_query_absent() {
    // After insert(x); remove(x), a query reports absence unless a distinct
    // inserted key shares x's fingerprint and one of its buckets. Single-key
    // case: no collider can exist.
    let mut filter = CuckooFilter::new(4, 1000, 2, 500).unwrap();
    filter.insert(b"solo");
    assert!(filter.remove(b"solo"));
    assert!(!filter.contains(b"solo"));
}

#[test]
fn test_remove_many_round_trip() {
    let mut filter = CuckooFilter::new(4, 4096, 4, 500).unwrap();
    let values: Vec<u32> = (0..1000).collect();

    for val in &values {
        assert!(filter.insert(&val.to_le_bytes()));
    }
    for val in &values {
        assert!(filter.remove(&val.to_le_bytes()), "remove failed for {val}");
    }
    assert!(filter.is_empty());
    // The filter is empty, so every query must now miss.
    for val in &values {
        assert!(!filter.contains(&val.to_le_bytes()));
    }
}

#[test]
fn test_remove_only_one_occurrence() {
    let mut filter = CuckooFilter::new(4, 100, 2, 500).unwrap();
    filter.insert(b"dup");
    filter.insert(b"dup");
    assert_eq!(filter.len(), 2);

    assert!(filter.remove(b"dup"));
    assert!(filter.contains(b"dup"), "second copy must survive");
    assert!(filter.remove(b"dup"));
    assert!(!filter.contains(b"dup"));
}

// ============================================================================
// Saturation
// ============================================================================

#[test]
fn test_saturation_reports_failure() {
    let mut filter = CuckooFilter::new(2, 4, 2, 20).unwrap();
    let capacity = filter.capacity();

    let mut failures = 0;
    for i in 0u32..64 {
        if !filter.insert(&i.to_le_bytes()) {
            failures += 1;
        }
    }
    assert!(failures > 0, "overdriving the filter must fail some inserts");
    assert!(filter.len() <= capacity);
}

// ============================================================================
// Determinism and configuration
// ============================================================================

#[test]
fn test_seeded_runs_are_identical() {
    let mut a = CuckooFilter::with_seed(2, 16, 2, 100, 7).unwrap();
    let mut b = CuckooFilter::with_seed(2, 16, 2, 100, 7).unwrap();

    for i in 0u32..200 {
        let key = i.to_le_bytes();
        assert_eq!(a.insert(&key), b.insert(&key), "divergence at {i}");
    }
    assert_eq!(a.len(), b.len());
    for i in 0u32..200 {
        let key = i.to_le_bytes();
        assert_eq!(a.contains(&key), b.contains(&key));
    }
}

#[test]
fn test_config_echo() {
    let filter = CuckooFilter::new(4, 100, 1, 500).unwrap();
    let config = filter.config();
    assert_eq!(config.bucket_size, 4);
    assert_eq!(config.num_buckets, 100);
    assert_eq!(config.fingerprint_size, 1);
    assert_eq!(config.max_evictions, 500);
}

#[test]
fn test_invalid_fingerprint_width() {
    assert!(CuckooFilter::new(4, 100, 0, 500).is_err());
    assert!(CuckooFilter::new(4, 100, 9, 500).is_err());
    assert!(CuckooFilter::new(4, 100, 8, 500).is_ok());
}
