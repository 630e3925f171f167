//! Consistent-hash routing
//!
//! A fixed-size circular address space of slots holding items and virtual
//! server nodes. Items are placed by hash plus linear probing; ownership is
//! decided by successor lookup over the online servers. Servers can be taken
//! offline and brought back, with their items migrating to and from the
//! neighbor that covers their arc.

mod ring;
mod server;

pub use ring::{IndexKind, Ring, Slot};
pub use server::Server;
