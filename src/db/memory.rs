use std::collections::HashMap;

use thiserror::Error;

use crate::db::MapStore;

/// Error returned by [`MemoryStore`]
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MemoryStoreError {
    /// The key has no entry in the store
    #[error("key {} not found", hex::encode(.0))]
    KeyNotFound(Vec<u8>),
}

/// A simple in-memory store, usable as both node store and value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }
}

impl MapStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), Self::Error> {
        self.entries.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error> {
        match self.entries.remove(key) {
            Some(_) => Ok(()),
            None => Err(MemoryStoreError::KeyNotFound(key.to_vec())),
        }
    }
}
