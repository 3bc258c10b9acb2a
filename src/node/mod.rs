mod branch;
mod hasher;
mod leaf;

use sha2::{Digest, Sha256};
use std::fmt::Display;

pub use branch::Branch;
pub use hasher::{TreeHasher, LEAF_PREFIX, NODE_PREFIX};
pub use leaf::LeafNode;

impl Hasher<32> for Sha256 {
    fn hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}

/// Simple hash trait required to hash keys, values and nodes of the tree.
///
/// Implementations must be stateless: every call hashes `data` from scratch.
///
/// # Type Parameters
/// * `HASH_SIZE` - The size of the hash digest in bytes
pub trait Hasher<const HASH_SIZE: usize> {
    fn hash(data: &[u8]) -> [u8; HASH_SIZE];
}

/// A node materialized in the node store.
///
/// Empty subtrees are never stored; they are the placeholder digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<const HASH_SIZE: usize> {
    /// A leaf holding one key
    Leaf(LeafNode<HASH_SIZE>),
    /// A branch with two children
    Branch(Branch<HASH_SIZE>),
}

impl<const HASH_SIZE: usize> Node<HASH_SIZE> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns the digest of the node. This function performs a hash.
    pub fn hash<H: Hasher<HASH_SIZE>>(&self) -> [u8; HASH_SIZE] {
        match self {
            Self::Leaf(leaf) => leaf.hash::<H>(),
            Self::Branch(branch) => branch.hash::<H>(),
        }
    }

    /// Returns the serialized form stored in the node store.
    pub fn encode<H: Hasher<HASH_SIZE>>(&self) -> Vec<u8> {
        match self {
            Self::Leaf(leaf) => leaf.encode::<H>(),
            Self::Branch(branch) => branch.encode::<H>(),
        }
    }
}

impl<const HASH_SIZE: usize> Display for Node<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{}", leaf),
            Self::Branch(branch) => write!(f, "{}", branch),
        }
    }
}
