//! Compact Sparse Merkle Tree implementation
//!
//! This crate provides a Sparse Merkle Tree (SMT): an authenticated key-value
//! map over a key space of `2^(8 * HASH_SIZE)` slots that can prove the
//! presence or absence of any key against a single root digest.
//!
//! The tree is compact: a subtree that holds a single entry is stored as that
//! entry's leaf, so the number of stored nodes grows with the number of
//! entries rather than with the depth of the tree.
//!
//! The tree supports:
//! - Get, update and delete of arbitrary byte keys and values
//! - Membership and non-membership proofs, with a compressed wire format
//! - Pre-order traversal of the stored nodes from any retained root
//! - Flexible storage backend through the `MapStore` trait

mod db;
mod error;
mod node;
mod proof;
mod tree;

pub use db::{MapStore, MemoryStore, MemoryStoreError, ThreadSafe};
pub use error::{DecodeError, ProofError, TreeError};
pub use node::{Branch, Hasher, LeafNode, Node, TreeHasher, LEAF_PREFIX, NODE_PREFIX};
pub use proof::{verify_proof, CompressedProof, Proof, ProofKind};
pub use tree::{
    bit_index, count_common_prefix, walk_up, LeafIterator, NodeEntry, NodeIterator,
    SparseMerkleTree,
};

#[cfg(test)]
mod tests;
