use std::fmt::Display;

use super::{Hasher, TreeHasher};

/// A Leaf holds exactly one key of the tree.
///
/// It only stores the key's path and the hash of its value; the value itself
/// lives in the value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafNode<const HASH_SIZE: usize> {
    path: [u8; HASH_SIZE],
    value_hash: [u8; HASH_SIZE],
}

impl<const HASH_SIZE: usize> LeafNode<HASH_SIZE> {
    pub fn new(path: [u8; HASH_SIZE], value_hash: [u8; HASH_SIZE]) -> Self {
        Self { path, value_hash }
    }

    /// Builds the leaf for `key` holding `value`. This function performs two hashes.
    pub fn from_entry<H: Hasher<HASH_SIZE>>(key: &[u8], value: &[u8]) -> Self {
        Self::new(
            TreeHasher::<HASH_SIZE, H>::path(key),
            TreeHasher::<HASH_SIZE, H>::digest(value),
        )
    }

    /// Returns the path (hashed key) of the leaf.
    pub fn path(&self) -> &[u8; HASH_SIZE] {
        &self.path
    }

    /// Returns the hash of the value held by the leaf.
    pub fn value_hash(&self) -> &[u8; HASH_SIZE] {
        &self.value_hash
    }

    /// Returns the digest of the leaf. This function performs a hash.
    pub fn hash<H: Hasher<HASH_SIZE>>(&self) -> [u8; HASH_SIZE] {
        TreeHasher::<HASH_SIZE, H>::digest_leaf(&self.path, &self.value_hash)
    }

    /// Returns the serialized form stored in the node store.
    pub fn encode<H: Hasher<HASH_SIZE>>(&self) -> Vec<u8> {
        TreeHasher::<HASH_SIZE, H>::encode_leaf(&self.path, &self.value_hash)
    }
}

impl<const HASH_SIZE: usize> Display for LeafNode<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Leaf {{ path: {}, value_hash: {} }}",
            hex::encode(self.path),
            hex::encode(self.value_hash)
        )
    }
}
