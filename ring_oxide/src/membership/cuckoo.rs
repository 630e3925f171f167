//! Cuckoo filter
//!
//! A bucketed fingerprint store with two candidate buckets per item and
//! random-walk eviction. Supports insertion, membership queries, and removal.
//!
//! Each item is reduced to a small fingerprint stored in one of two buckets;
//! the alternate bucket index is recoverable from any bucket index and the
//! fingerprint alone (XOR identity), which is what makes the eviction chain
//! possible. When both candidate buckets are full, residents are displaced
//! along the chain up to an eviction bound; exhausting the bound fails the
//! insert and drops the last displaced fingerprint.
//!
//! Eviction choices come from an explicit seedable RNG, so a seeded filter is
//! fully deterministic.
//!
//! # Example
//! ```
//! use ring_oxide::membership::CuckooFilter;
//!
//! let mut filter = CuckooFilter::new(4, 100, 1, 500).unwrap();
//!
//! assert!(filter.insert(b"apple"));
//! assert!(filter.contains(b"apple"));
//!
//! filter.remove(b"apple");
//! assert!(!filter.contains(b"apple"));
//! ```

use crate::common::hash::seeded_hash;
use crate::common::validation::validate_cuckoo_parameters;
use crate::common::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Default RNG seed used by [`CuckooFilter::new`]
const DEFAULT_SEED: u64 = 0x12345678;

/// Construction parameters, echoed by [`CuckooFilter::config`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuckooConfig {
    /// Fingerprints per bucket
    pub bucket_size: usize,
    /// Number of buckets
    pub num_buckets: usize,
    /// Fingerprint width in bytes
    pub fingerprint_size: usize,
    /// Eviction-chain bound
    pub max_evictions: usize,
}

/// A bucket holding up to `bucket_size` fingerprints.
///
/// Slots are a variable-length list rather than a fixed array with a reserved
/// empty marker, so a fingerprint of zero is an ordinary value and absence is
/// unambiguous.
#[derive(Clone, Debug)]
struct Bucket {
    fingerprints: Vec<u64>,
}

impl Bucket {
    fn with_capacity(bucket_size: usize) -> Self {
        Bucket {
            fingerprints: Vec::with_capacity(bucket_size),
        }
    }

    fn has_room(&self, bucket_size: usize) -> bool {
        self.fingerprints.len() < bucket_size
    }

    fn push(&mut self, fp: u64) {
        self.fingerprints.push(fp);
    }

    fn contains(&self, fp: u64) -> bool {
        self.fingerprints.contains(&fp)
    }

    /// Removes one occurrence of `fp` if present
    fn remove(&mut self, fp: u64) -> bool {
        if let Some(idx) = self.fingerprints.iter().position(|&f| f == fp) {
            self.fingerprints.swap_remove(idx);
            return true;
        }
        false
    }

    /// Swaps a random resident fingerprint with `fp`, returning the evicted one
    fn swap_random(&mut self, fp: u64, rng: &mut SmallRng) -> u64 {
        let idx = rng.random_range(0..self.fingerprints.len());
        let old = self.fingerprints[idx];
        self.fingerprints[idx] = fp;
        old
    }
}

/// Cuckoo filter for membership testing with deletions
#[derive(Clone, Debug)]
pub struct CuckooFilter {
    /// Buckets containing fingerprints
    buckets: Vec<Bucket>,
    /// Fingerprints per bucket
    bucket_size: usize,
    /// Number of buckets
    num_buckets: usize,
    /// Fingerprint width in bytes
    fingerprint_size: usize,
    /// Eviction-chain bound
    max_evictions: usize,
    /// Number of fingerprints currently stored
    count: usize,
    /// Random number generator for eviction choices
    rng: SmallRng,
}

impl CuckooFilter {
    /// Creates a new cuckoo filter with a fixed default RNG seed.
    ///
    /// # Errors
    /// Returns an error if `bucket_size` or `num_buckets` is 0, or
    /// `fingerprint_size` is outside `[1, 8]` bytes.
    pub fn new(
        bucket_size: usize,
        num_buckets: usize,
        fingerprint_size: usize,
        max_evictions: usize,
    ) -> Result<Self> {
        Self::with_seed(
            bucket_size,
            num_buckets,
            fingerprint_size,
            max_evictions,
            DEFAULT_SEED,
        )
    }

    /// Creates a cuckoo filter with an explicit RNG seed.
    ///
    /// Two filters built with the same parameters and seed observe identical
    /// eviction behavior for identical operation sequences.
    ///
    /// # Errors
    /// Same conditions as [`CuckooFilter::new`].
    pub fn with_seed(
        bucket_size: usize,
        num_buckets: usize,
        fingerprint_size: usize,
        max_evictions: usize,
        seed: u64,
    ) -> Result<Self> {
        validate_cuckoo_parameters(bucket_size, num_buckets, fingerprint_size)?;

        debug!(
            num_buckets,
            bucket_size, fingerprint_size, "initialized cuckoo filter"
        );

        Ok(CuckooFilter {
            buckets: vec![Bucket::with_capacity(bucket_size); num_buckets],
            bucket_size,
            num_buckets,
            fingerprint_size,
            max_evictions,
            count: 0,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Fingerprint of a key: `H(0, key)` truncated to the configured width
    /// (little-endian low bytes).
    #[inline]
    fn fingerprint(&self, key: &[u8]) -> u64 {
        let hash = seeded_hash(key, 0) as u64;
        if self.fingerprint_size >= 8 {
            hash
        } else {
            hash & ((1u64 << (self.fingerprint_size * 8)) - 1)
        }
    }

    /// Hash of a fingerprint's byte representation
    #[inline]
    fn fingerprint_hash(&self, fp: u64) -> usize {
        let bytes = fp.to_le_bytes();
        seeded_hash(&bytes[..self.fingerprint_size], 0) as usize
    }

    /// Primary bucket index: `H(0, fp) mod num_buckets`
    #[inline]
    fn bucket_index(&self, fp: u64) -> usize {
        self.fingerprint_hash(fp) % self.num_buckets
    }

    /// Alternate bucket index: `(index XOR H(0, fp)) mod num_buckets`
    #[inline]
    fn alternate_index(&self, index: usize, fp: u64) -> usize {
        (index ^ self.fingerprint_hash(fp)) % self.num_buckets
    }

    /// Inserts a key.
    ///
    /// Returns `false` when both candidate buckets are full and the eviction
    /// budget is exhausted. In that case the fingerprint displaced last is
    /// dropped: a previously inserted item may be lost. This data-loss mode
    /// only occurs under saturation.
    pub fn insert(&mut self, key: &[u8]) -> bool {
        let fp = self.fingerprint(key);
        let i1 = self.bucket_index(fp);
        let i2 = self.alternate_index(i1, fp);

        if self.buckets[i1].has_room(self.bucket_size) {
            self.buckets[i1].push(fp);
            self.count += 1;
            return true;
        }
        if self.buckets[i2].has_room(self.bucket_size) {
            self.buckets[i2].push(fp);
            self.count += 1;
            return true;
        }

        // Both candidates full: displace residents along the eviction chain.
        let mut fp = fp;
        let mut index = if self.rng.random::<bool>() { i1 } else { i2 };
        for _ in 0..self.max_evictions {
            fp = self.buckets[index].swap_random(fp, &mut self.rng);
            index = self.alternate_index(index, fp);

            if self.buckets[index].has_room(self.bucket_size) {
                self.buckets[index].push(fp);
                self.count += 1;
                return true;
            }
        }

        warn!(
            max_evictions = self.max_evictions,
            "insert failed after exhausting eviction budget; displaced fingerprint dropped"
        );
        false
    }

    /// Checks whether a key might be in the set: its fingerprint appears in
    /// either candidate bucket.
    pub fn contains(&self, key: &[u8]) -> bool {
        let fp = self.fingerprint(key);
        let i1 = self.bucket_index(fp);
        let i2 = self.alternate_index(i1, fp);

        self.buckets[i1].contains(fp) || self.buckets[i2].contains(fp)
    }

    /// Removes one occurrence of the key's fingerprint from either candidate
    /// bucket.
    ///
    /// Returns `true` if a fingerprint was removed. Removing a key that was
    /// never inserted may strip a colliding fingerprint instead, producing a
    /// false negative for the colliding item; callers must only remove keys
    /// they previously inserted.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        let fp = self.fingerprint(key);
        let i1 = self.bucket_index(fp);
        let i2 = self.alternate_index(i1, fp);

        if self.buckets[i1].remove(fp) {
            self.count -= 1;
            return true;
        }
        if self.buckets[i2].remove(fp) {
            self.count -= 1;
            return true;
        }
        false
    }

    /// Returns the construction parameters
    pub fn config(&self) -> CuckooConfig {
        CuckooConfig {
            bucket_size: self.bucket_size,
            num_buckets: self.num_buckets,
            fingerprint_size: self.fingerprint_size,
            max_evictions: self.max_evictions,
        }
    }

    /// Returns the number of fingerprints stored
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the filter holds no fingerprints
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the maximum number of fingerprints the filter can hold
    pub fn capacity(&self) -> usize {
        self.num_buckets * self.bucket_size
    }

    /// Returns the fingerprint storage footprint at capacity, in bytes
    pub fn memory_usage(&self) -> usize {
        self.num_buckets * self.bucket_size * self.fingerprint_size
    }

    /// Clears all fingerprints
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.fingerprints.clear();
        }
        self.count = 0;
    }
}
