//! Storage system façade over interchangeable membership stores

use crate::common::Result;
use crate::membership::{BloomFilter, CountingBloomFilter, CuckooFilter};
use crate::routing::Ring;
use tracing::warn;

/// A membership store: any structure offering insert / contains / remove.
///
/// Dispatch is by enum match rather than trait objects; the variant set is
/// closed and the stores' signatures differ too much (hint returns, capacity
/// failures, routing errors) for a single trait to stay honest.
#[derive(Debug)]
pub enum Store {
    /// Simple Bloom filter (no removal)
    Bloom(BloomFilter),
    /// Counting Bloom filter
    CountingBloom(CountingBloomFilter),
    /// Cuckoo filter
    Cuckoo(CuckooFilter),
    /// Consistent-hash ring
    Ring(Ring),
}

impl Store {
    /// Inserts an item.
    ///
    /// Returns `Ok(false)` when the store rejects the item: a saturated
    /// cuckoo filter, a full ring, or a Bloom filter reporting the item as
    /// likely already present.
    ///
    /// # Errors
    /// Ring-backed stores surface invariant violations.
    pub fn insert(&mut self, item: &[u8]) -> Result<bool> {
        match self {
            Store::Bloom(filter) => Ok(filter.insert(item)),
            Store::CountingBloom(filter) => {
                filter.insert(item);
                Ok(true)
            }
            Store::Cuckoo(filter) => Ok(filter.insert(item)),
            Store::Ring(ring) => ring.insert(item),
        }
    }

    /// Checks whether an item might be present
    pub fn contains(&self, item: &[u8]) -> bool {
        match self {
            Store::Bloom(filter) => filter.contains(item),
            Store::CountingBloom(filter) => filter.contains(item),
            Store::Cuckoo(filter) => filter.contains(item),
            Store::Ring(ring) => ring.query(item),
        }
    }

    /// Removes an item. Simple Bloom filters cannot remove; that case warns
    /// and returns `Ok(false)`.
    ///
    /// # Errors
    /// Ring-backed stores surface invariant violations.
    pub fn remove(&mut self, item: &[u8]) -> Result<bool> {
        match self {
            Store::Bloom(_) => {
                warn!("simple bloom filters do not support removal; no-op");
                Ok(false)
            }
            Store::CountingBloom(filter) => Ok(filter.remove(item)),
            Store::Cuckoo(filter) => Ok(filter.remove(item)),
            Store::Ring(ring) => Ok(ring.remove(item)?.is_some()),
        }
    }

    /// Returns the store's memory footprint in bytes
    pub fn memory_usage(&self) -> usize {
        match self {
            Store::Bloom(filter) => filter.memory_usage(),
            Store::CountingBloom(filter) => filter.memory_usage(),
            Store::Cuckoo(filter) => filter.memory_usage(),
            Store::Ring(ring) => ring.memory_usage(),
        }
    }
}

/// Data storage system: a username filter plus an item store.
///
/// # Example
/// ```
/// use ring_oxide::membership::BloomFilter;
/// use ring_oxide::routing::{IndexKind, Ring};
/// use ring_oxide::storage::{StorageSystem, Store};
///
/// let users = Store::Bloom(BloomFilter::new(0.01, 1000));
/// let data = Store::Ring(Ring::new(1000, 4, IndexKind::RedBlack).unwrap());
/// let mut system = StorageSystem::new(users, data);
///
/// system.add_user(b"alice").unwrap();
/// system.add_item(b"report.pdf").unwrap();
/// assert!(system.get_item(b"report.pdf"));
/// ```
#[derive(Debug)]
pub struct StorageSystem {
    users: Store,
    data: Store,
}

impl StorageSystem {
    /// Creates a system from a username store and an item store
    pub fn new(users: Store, data: Store) -> Self {
        StorageSystem { users, data }
    }

    /// Registers a username.
    ///
    /// # Errors
    /// Surfaces invariant violations from ring-backed stores.
    pub fn add_user(&mut self, name: &[u8]) -> Result<bool> {
        self.users.insert(name)
    }

    /// Stores an item.
    ///
    /// # Errors
    /// Surfaces invariant violations from ring-backed stores.
    pub fn add_item(&mut self, item: &[u8]) -> Result<bool> {
        self.data.insert(item)
    }

    /// Checks whether an item is stored
    pub fn get_item(&self, item: &[u8]) -> bool {
        self.data.contains(item)
    }

    /// Removes an item.
    ///
    /// # Errors
    /// Surfaces invariant violations from ring-backed stores.
    pub fn remove_item(&mut self, item: &[u8]) -> Result<bool> {
        self.data.remove(item)
    }

    /// Returns the combined memory footprint of both stores, in bytes
    pub fn memory_usage(&self) -> usize {
        self.users.memory_usage() + self.data.memory_usage()
    }
}
