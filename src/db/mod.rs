//! Storage backends for the tree.
//!
//! The tree persists two byte maps: node encodings keyed by their digest, and
//! raw values keyed by the original key. Both go through [`MapStore`].

mod memory;
mod store;

pub use memory::{MemoryStore, MemoryStoreError};
pub use store::{MapStore, ThreadSafe};
