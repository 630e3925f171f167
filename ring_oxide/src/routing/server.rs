//! Virtual server node

use std::collections::HashSet;

/// A storage node bound to one ring position.
///
/// The position is assigned at ring construction and never changes; only the
/// online flag and the assigned item set evolve. An offline server owns no
/// arc and receives no items.
#[derive(Clone, Debug)]
pub struct Server {
    id: usize,
    position: usize,
    online: bool,
    items: HashSet<Vec<u8>>,
}

impl Server {
    /// Creates an online server with an empty item set
    pub(crate) fn new(id: usize, position: usize) -> Self {
        Server {
            id,
            position,
            online: true,
            items: HashSet::new(),
        }
    }

    /// Returns the server id
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the server's ring position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns whether the server is online
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Returns the items currently assigned to this server
    pub fn items(&self) -> &HashSet<Vec<u8>> {
        &self.items
    }

    /// Returns the number of assigned items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no items are assigned
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub(crate) fn insert_item(&mut self, item: Vec<u8>) {
        self.items.insert(item);
    }

    pub(crate) fn remove_item(&mut self, item: &[u8]) -> bool {
        self.items.remove(item)
    }

    /// Takes the whole item set, leaving the server empty
    pub(crate) fn take_items(&mut self) -> HashSet<Vec<u8>> {
        std::mem::take(&mut self.items)
    }

    pub(crate) fn extend_items(&mut self, items: HashSet<Vec<u8>>) {
        self.items.extend(items);
    }
}
