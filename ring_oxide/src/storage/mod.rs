//! Storage façade
//!
//! Binds a username filter and an item store behind a single surface. Any of
//! the membership filters or the ring can back either side.

mod system;

pub use system::{Store, StorageSystem};
