//! Consistent-hash ring
//!
//! A circular array of `ring_size` slots. Servers are pinned to evenly spaced
//! slots at construction; items hash to a starting slot and linear-probe
//! forward to the first empty one. The server owning an item is the next
//! online server clockwise from the item's slot, found either by scanning the
//! slots or by a successor query against an ordered index of online server
//! positions.
//!
//! Taking a server offline hands its items to that next online server without
//! re-hashing; bringing it back reclaims exactly the items whose slots fall
//! in its restored arc.

use crate::common::hash::hash_to_range;
use crate::common::validation::validate_ring_parameters;
use crate::common::{Result, StoreError};
use crate::index::{BstIndex, RbTree, SuccessorIndex};
use tracing::{debug, warn};

use super::server::Server;

/// Successor-index selection, fixed at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    /// No index; successor lookup scans the slots linearly
    Linear,
    /// Unbalanced binary search tree
    Bst,
    /// Red-black tree
    RedBlack,
}

/// Contents of one ring slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Unoccupied slot
    Empty,
    /// A stored item
    Item(Vec<u8>),
    /// A server, identified by id
    Server(usize),
}

/// Fixed-size consistent-hash ring
pub struct Ring {
    slots: Vec<Slot>,
    servers: Vec<Server>,
    /// Ordered index of online server positions; `None` in linear mode
    index: Option<Box<dyn SuccessorIndex>>,
}

/// Whether `idx` lies strictly inside the clockwise arc from `start` to
/// `end`. When `start > end` the arc wraps through slot 0. Derived from ring
/// geometry; residue arithmetic misbehaves exactly at the wrap point.
fn in_open_arc(idx: usize, start: usize, end: usize) -> bool {
    if start < end {
        start < idx && idx < end
    } else {
        idx > start || idx < end
    }
}

impl Ring {
    /// Creates a ring with `num_servers` online servers spaced evenly over
    /// `ring_size` slots.
    ///
    /// Server `id` gets natural position `id * ring_size / num_servers`,
    /// probed forward to the next empty slot if taken. Positions never change
    /// afterwards.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidParameter`] if either size is 0 or there
    /// are more servers than slots.
    pub fn new(ring_size: usize, num_servers: usize, kind: IndexKind) -> Result<Self> {
        validate_ring_parameters(ring_size, num_servers)?;

        let mut index: Option<Box<dyn SuccessorIndex>> = match kind {
            IndexKind::Linear => None,
            IndexKind::Bst => Some(Box::new(BstIndex::new())),
            IndexKind::RedBlack => Some(Box::new(RbTree::new())),
        };

        let mut slots = vec![Slot::Empty; ring_size];
        let mut servers = Vec::with_capacity(num_servers);
        for id in 0..num_servers {
            let mut position = id * ring_size / num_servers;
            while slots[position] != Slot::Empty {
                position = (position + 1) % ring_size;
            }
            slots[position] = Slot::Server(id);
            if let Some(index) = index.as_mut() {
                if !index.insert(position as u64, id) {
                    return Err(StoreError::InvariantViolation(format!(
                        "overlapping ring position {position}"
                    )));
                }
            }
            debug!(id, position, "placed server");
            servers.push(Server::new(id, position));
        }

        Ok(Ring {
            slots,
            servers,
            index,
        })
    }

    /// Returns the number of slots
    pub fn ring_size(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of servers (online or not)
    pub fn num_servers(&self) -> usize {
        self.servers.len()
    }

    /// Starting slot for an item: `H(0, item) mod ring_size`
    #[inline]
    fn position_of(&self, item: &[u8]) -> usize {
        hash_to_range(item, 0, self.slots.len())
    }

    /// Server id stored in the slot at `position`
    fn server_at(&self, position: usize) -> Result<usize> {
        match self.slots[position] {
            Slot::Server(id) => Ok(id),
            _ => Err(StoreError::InvariantViolation(format!(
                "expected a server at ring position {position}"
            ))),
        }
    }

    /// Returns the position of the first online server strictly clockwise of
    /// `position`, wrapping around the ring.
    ///
    /// # Errors
    /// Returns [`StoreError::InvariantViolation`] if no online server exists.
    pub fn find_server(&self, position: usize) -> Result<usize> {
        match self.index.as_ref() {
            Some(index) => index
                .successor(position as u64)
                .map(|p| p as usize)
                .ok_or_else(|| {
                    StoreError::InvariantViolation("no live server on the ring".to_string())
                }),
            None => {
                let len = self.slots.len();
                let mut idx = (position + 1) % len;
                for _ in 0..len {
                    if let Slot::Server(id) = self.slots[idx] {
                        if self.servers[id].is_online() {
                            return Ok(idx);
                        }
                    }
                    idx = (idx + 1) % len;
                }
                Err(StoreError::InvariantViolation(
                    "no live server on the ring".to_string(),
                ))
            }
        }
    }

    /// Inserts an item: probe forward from its hash position to the first
    /// empty slot, then assign it to the owning server.
    ///
    /// Returns `Ok(false)` when the ring has no empty slot left.
    ///
    /// # Errors
    /// Returns [`StoreError::InvariantViolation`] if no online server exists.
    pub fn insert(&mut self, item: &[u8]) -> Result<bool> {
        let len = self.slots.len();
        let mut idx = self.position_of(item);
        for _ in 0..len {
            if self.slots[idx] == Slot::Empty {
                let owner = self.server_at(self.find_server(idx)?)?;
                self.slots[idx] = Slot::Item(item.to_vec());
                self.servers[owner].insert_item(item.to_vec());
                debug!(slot = idx, owner, "placed item");
                return Ok(true);
            }
            idx = (idx + 1) % len;
        }
        warn!("ring is full; insert rejected");
        Ok(false)
    }

    /// Checks whether an item is stored on the ring.
    ///
    /// The probe stops at the first empty slot: an item displaced past a slot
    /// that was later vacated by a removal is treated as absent.
    pub fn query(&self, item: &[u8]) -> bool {
        let len = self.slots.len();
        let mut idx = self.position_of(item);
        for _ in 0..len {
            match &self.slots[idx] {
                Slot::Item(stored) if stored.as_slice() == item => return true,
                Slot::Empty => return false,
                _ => {}
            }
            idx = (idx + 1) % len;
        }
        false
    }

    /// Returns the slot position of an item, sweeping the whole ring
    pub fn find(&self, item: &[u8]) -> Option<usize> {
        let len = self.slots.len();
        let mut idx = self.position_of(item);
        for _ in 0..len {
            if let Slot::Item(stored) = &self.slots[idx] {
                if stored.as_slice() == item {
                    return Some(idx);
                }
            }
            idx = (idx + 1) % len;
        }
        None
    }

    /// Removes an item from the ring and from its owning server, returning
    /// the stored bytes. Sweeps the whole ring; `Ok(None)` if absent.
    ///
    /// # Errors
    /// Returns [`StoreError::InvariantViolation`] if the item's owner does
    /// not hold it.
    pub fn remove(&mut self, item: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(idx) = self.find(item) else {
            return Ok(None);
        };

        self.slots[idx] = Slot::Empty;
        let owner = self.server_at(self.find_server(idx)?)?;
        if !self.servers[owner].remove_item(item) {
            return Err(StoreError::InvariantViolation(format!(
                "item at slot {idx} is missing from its owning server {owner}"
            )));
        }
        debug!(slot = idx, owner, "removed item");
        Ok(Some(item.to_vec()))
    }

    /// Takes a server offline, handing its items to the next online server.
    ///
    /// The items keep their slots; only the owning server changes. Taking an
    /// already-offline server offline is a warning no-op.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidParameter`] for an unknown id and
    /// [`StoreError::InvariantViolation`] if no other online server could
    /// absorb the items.
    pub fn simulate_offline(&mut self, id: usize) -> Result<()> {
        let server = self.servers.get(id).ok_or_else(|| StoreError::InvalidParameter {
            param: "id".to_string(),
            value: id.to_string(),
            constraint: format!("must be < {}", self.servers.len()),
        })?;
        if !server.is_online() {
            warn!(id, "server is already offline");
            return Ok(());
        }

        let position = server.position();
        let next_pos = self.find_server(position)?;
        if next_pos == position {
            return Err(StoreError::InvariantViolation(
                "no other live server to absorb the failing server's items".to_string(),
            ));
        }
        let next = self.server_at(next_pos)?;

        let items = self.servers[id].take_items();
        debug!(id, next, moved = items.len(), "transferring items off failing server");
        self.servers[next].extend_items(items);

        if let Some(index) = self.index.as_mut() {
            index.remove(position as u64);
        }
        self.servers[id].set_online(false);
        Ok(())
    }

    /// Brings a server back online, reclaiming the items of its restored arc
    /// from the neighbor that covered it.
    ///
    /// An item is reclaimed when its slot does not lie strictly between the
    /// returning server's position and the covering server's position in ring
    /// order. Bringing an already-online server online is a warning no-op.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidParameter`] for an unknown id and
    /// [`StoreError::InvariantViolation`] if the ring state is inconsistent.
    pub fn simulate_online(&mut self, id: usize) -> Result<()> {
        let server = self.servers.get(id).ok_or_else(|| StoreError::InvalidParameter {
            param: "id".to_string(),
            value: id.to_string(),
            constraint: format!("must be < {}", self.servers.len()),
        })?;
        if server.is_online() {
            warn!(id, "server is already online");
            return Ok(());
        }

        let position = server.position();
        if let Some(index) = self.index.as_mut() {
            if !index.insert(position as u64, id) {
                return Err(StoreError::InvariantViolation(format!(
                    "ring position {position} already indexed"
                )));
            }
        }

        // The covering neighbor. Equal to `position` only when no other
        // server is online, in which case there is nothing to reclaim.
        let next_pos = self.find_server(position)?;
        if next_pos != position {
            let next = self.server_at(next_pos)?;
            let candidates: Vec<Vec<u8>> =
                self.servers[next].items().iter().cloned().collect();
            let mut reclaimed = 0usize;
            for item in candidates {
                let idx = self.find(&item).ok_or_else(|| {
                    StoreError::InvariantViolation(format!(
                        "item assigned to server {next} is missing from the ring"
                    ))
                })?;
                if !in_open_arc(idx, position, next_pos) {
                    self.servers[next].remove_item(&item);
                    self.servers[id].insert_item(item);
                    reclaimed += 1;
                }
            }
            debug!(id, from = next, reclaimed, "reclaimed arc items");
        }

        self.servers[id].set_online(true);
        Ok(())
    }

    /// Returns the slot array
    pub fn get_ring(&self) -> &[Slot] {
        &self.slots
    }

    /// Returns per-server item counts, in id order
    pub fn get_server_sizes(&self) -> Vec<usize> {
        self.servers.iter().map(Server::len).collect()
    }

    /// Returns the servers, in id order
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Returns the memory held by the slot array and stored items, in bytes
    pub fn memory_usage(&self) -> usize {
        let slot_bytes = self.slots.len() * std::mem::size_of::<Slot>();
        let item_bytes: usize = self
            .servers
            .iter()
            .flat_map(|s| s.items().iter())
            .map(Vec::len)
            .sum();
        slot_bytes + item_bytes
    }
}

impl std::fmt::Debug for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let online = self.servers.iter().filter(|s| s.is_online()).count();
        let items: usize = self.servers.iter().map(Server::len).sum();
        f.debug_struct("Ring")
            .field("ring_size", &self.slots.len())
            .field("num_servers", &self.servers.len())
            .field("online", &online)
            .field("items", &items)
            .field("indexed", &self.index.is_some())
            .finish()
    }
}
