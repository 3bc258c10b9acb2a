//! Store trait used for both the node store and the value store

use std::fmt::{Debug, Display};

/// Thread safety marker trait
#[cfg(feature = "multi-thread")]
pub trait ThreadSafe: Send + Sync {}
#[cfg(feature = "multi-thread")]
impl<T: Send + Sync> ThreadSafe for T {}

#[cfg(not(feature = "multi-thread"))]
pub trait ThreadSafe {}
#[cfg(not(feature = "multi-thread"))]
impl<T> ThreadSafe for T {}

/// Byte-keyed, byte-valued map backing the tree.
///
/// The node store is keyed by node digest and the value store by the original
/// (unhashed) key. Implementations own their retry policy: the tree never
/// retries a failed call.
pub trait MapStore: ThreadSafe {
    /// The error type for store operations
    type Error: Debug + Display;

    /// Get the value stored at `key`, or `None` if there is none.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Store `value` at `key`, overwriting any previous value.
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), Self::Error>;

    /// Remove the value at `key`. Fails if the key is absent.
    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error>;
}
