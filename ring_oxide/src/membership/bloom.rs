//! Simple Bloom filter
//!
//! A bit array with k seeded hash functions. Supports insertion and
//! membership queries only; bits are never cleared once set.
//!
//! Sizing favors a lower false-positive rate at the margin: the bit count is
//! rounded up and the hash count rounded down.
//!
//! # Example
//! ```
//! use ring_oxide::membership::BloomFilter;
//!
//! // Filter for 1000 expected keys with a 1% false positive rate
//! let mut filter = BloomFilter::new(0.01, 1000);
//! filter.insert(b"key1");
//!
//! assert!(filter.contains(b"key1"));
//! assert!(!filter.contains(b"key2")); // Probably false
//! ```

use crate::common::hash::hash_to_range;
use tracing::debug;

/// Simple Bloom filter for membership testing
#[derive(Clone)]
pub struct BloomFilter {
    /// Bit array packed into 64-bit words
    bits: Vec<u64>,
    /// Number of hash functions
    k: usize,
    /// Number of bits
    m: usize,
    /// Expected number of keys
    key_num: usize,
}

impl BloomFilter {
    /// Creates a new Bloom filter sized for `key_num` expected keys at the
    /// given false-positive rate.
    ///
    /// Bits: `m = ceil(key_num * ln(fpr) / ln(0.618))`.
    /// Hashes: `k = floor((m / key_num) * ln(2))`, at least one.
    ///
    /// # Panics
    /// Panics if `key_num` is 0 or `fpr` is not in range (0, 1)
    pub fn new(fpr: f64, key_num: usize) -> Self {
        assert!(key_num > 0, "Expected number of keys must be > 0");
        assert!(
            fpr > 0.0 && fpr < 1.0,
            "False positive rate must be in (0, 1)"
        );

        // Round the bit count up and the hash count down to favor a lower
        // false positive rate.
        let m = ((key_num as f64) * fpr.ln() / 0.618f64.ln()).ceil() as usize;
        let k = ((m as f64 / key_num as f64) * std::f64::consts::LN_2).floor() as usize;
        let k = k.max(1);

        Self::with_params(key_num, m, k)
    }

    /// Creates a Bloom filter with explicit parameters
    ///
    /// # Panics
    /// Panics if any parameter is 0
    pub fn with_params(key_num: usize, m: usize, k: usize) -> Self {
        assert!(key_num > 0, "Expected number of keys must be > 0");
        assert!(m > 0, "Number of bits must be > 0");
        assert!(k > 0, "Number of hash functions must be > 0");

        let num_words = m.div_ceil(64);
        debug!(m, k, "initialized simple bloom filter");

        Self {
            bits: vec![0u64; num_words],
            k,
            m,
            key_num,
        }
    }

    /// Bit position of hash function `i` for `key`: `H(i, key) mod m`
    #[inline]
    fn bit_index(&self, key: &[u8], i: usize) -> usize {
        hash_to_range(key, i as u32, self.m)
    }

    /// Inserts a key by setting all of its hashed bits.
    ///
    /// Returns `true` iff at least one of the bits was previously 0, i.e.
    /// the filter had not seen this key before. This is a *likely-new* hint
    /// only: a colliding key set may have covered all bits already, so a
    /// `false` return does not prove prior insertion.
    pub fn insert(&mut self, key: &[u8]) -> bool {
        let mut flipped = false;
        for i in 0..self.k {
            let bit = self.bit_index(key, i);
            let word = bit / 64;
            let mask = 1u64 << (bit % 64);
            if self.bits[word] & mask == 0 {
                flipped = true;
                self.bits[word] |= mask;
            }
        }
        flipped
    }

    /// Checks whether a key might be in the set.
    ///
    /// Returns `true` if the key might be present (possible false positive)
    /// and `false` if it is definitely absent (no false negatives).
    pub fn contains(&self, key: &[u8]) -> bool {
        for i in 0..self.k {
            let bit = self.bit_index(key, i);
            if self.bits[bit / 64] & (1u64 << (bit % 64)) == 0 {
                return false;
            }
        }
        true
    }

    /// Returns the number of bits set to 1
    pub fn count_bits(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Returns true if no keys have been inserted
    pub fn is_empty(&self) -> bool {
        self.count_bits() == 0
    }

    /// Clears all bits in the filter
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Returns the theoretical false positive rate at the current fill level
    pub fn false_positive_rate(&self) -> f64 {
        let fill = self.count_bits() as f64 / self.m as f64;
        fill.powi(self.k as i32)
    }

    /// Returns the memory held by the bit array, in bytes
    pub fn memory_usage(&self) -> usize {
        self.bits.len() * 8
    }

    /// Returns filter parameters `(key_num, m, k)`
    pub fn params(&self) -> (usize, usize, usize) {
        (self.key_num, self.m, self.k)
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFilter")
            .field("key_num", &self.key_num)
            .field("m", &self.m)
            .field("k", &self.k)
            .field("bits_set", &self.count_bits())
            .field("memory_bytes", &self.memory_usage())
            .finish()
    }
}
