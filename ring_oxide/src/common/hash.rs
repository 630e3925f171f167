//! Hash primitive for filter and ring placement
//!
//! A single seeded 32-bit non-cryptographic hash underlies every derived hash
//! in the crate: the Bloom family obtains its k-wise functions by varying the
//! seed, the cuckoo filter hashes fingerprint bytes, and the ring reduces the
//! hash modulo its size. xxHash32 provides the distribution and speed needed
//! for placement; none of this is collision-resistant in the adversarial
//! sense.

use xxhash_rust::xxh32::xxh32;

/// Seeded 32-bit hash over raw bytes.
///
/// Deterministic: the same `(data, seed)` pair always produces the same
/// value. Distinct seeds behave as independent hash functions.
///
/// # Examples
/// ```
/// use ring_oxide::common::hash::seeded_hash;
///
/// let h0 = seeded_hash(b"apple", 0);
/// let h1 = seeded_hash(b"apple", 1);
/// assert_eq!(h0, seeded_hash(b"apple", 0));
/// assert_ne!(h0, h1);
/// ```
#[inline]
pub fn seeded_hash(data: &[u8], seed: u32) -> u32 {
    xxh32(data, seed)
}

/// Seeded hash reduced into `[0, range)` by modulo.
///
/// # Panics
/// Panics in debug builds if `range` is zero.
#[inline]
pub fn hash_to_range(data: &[u8], seed: u32, range: usize) -> usize {
    debug_assert!(range > 0, "hash range must be > 0");
    seeded_hash(data, seed) as usize % range
}
