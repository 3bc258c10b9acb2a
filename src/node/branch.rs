use std::fmt::Display;

use super::{Hasher, TreeHasher};

/// A branch is a node that has exactly 2 children. Each child is either the
/// digest of a real node or the placeholder of an empty subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Branch<const HASH_SIZE: usize> {
    left: [u8; HASH_SIZE],
    right: [u8; HASH_SIZE],
}

impl<const HASH_SIZE: usize> Branch<HASH_SIZE> {
    pub fn new(left: [u8; HASH_SIZE], right: [u8; HASH_SIZE]) -> Self {
        Self { left, right }
    }

    /// Creates the branch whose child on the side selected by `bit` is
    /// `child` and whose other child is `sibling`.
    pub fn from_child(bit: u8, child: [u8; HASH_SIZE], sibling: [u8; HASH_SIZE]) -> Self {
        if bit == 0 {
            Self::new(child, sibling)
        } else {
            Self::new(sibling, child)
        }
    }

    /// Returns the left and right children of this branch.
    pub fn children(&self) -> (&[u8; HASH_SIZE], &[u8; HASH_SIZE]) {
        (&self.left, &self.right)
    }

    /// Returns the left child of this branch.
    pub fn left(&self) -> &[u8; HASH_SIZE] {
        &self.left
    }

    /// Returns the right child of this branch.
    pub fn right(&self) -> &[u8; HASH_SIZE] {
        &self.right
    }

    /// Returns `(next, sibling)` for a walk going down the side selected by `bit`.
    pub fn step(&self, bit: u8) -> ([u8; HASH_SIZE], [u8; HASH_SIZE]) {
        if bit == 0 {
            (self.left, self.right)
        } else {
            (self.right, self.left)
        }
    }

    /// Returns the digest of the branch. This function performs a hash.
    pub fn hash<H: Hasher<HASH_SIZE>>(&self) -> [u8; HASH_SIZE] {
        TreeHasher::<HASH_SIZE, H>::digest_node(&self.left, &self.right)
    }

    /// Returns the serialized form stored in the node store.
    pub fn encode<H: Hasher<HASH_SIZE>>(&self) -> Vec<u8> {
        TreeHasher::<HASH_SIZE, H>::encode_node(&self.left, &self.right)
    }
}

impl<const HASH_SIZE: usize> Display for Branch<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Branch {{ left: {}, right: {} }}",
            hex::encode(self.left),
            hex::encode(self.right)
        )
    }
}
