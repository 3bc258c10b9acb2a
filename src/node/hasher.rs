use std::marker::PhantomData;

use super::{Branch, Hasher, LeafNode, Node};
use crate::DecodeError;

/// Prefix byte of a serialized leaf node.
pub const LEAF_PREFIX: u8 = 0x00;
/// Prefix byte of a serialized branch node.
pub const NODE_PREFIX: u8 = 0x01;

/// Canonical digesting and encoding of tree nodes.
///
/// Leaves are encoded as `LEAF_PREFIX || path || value_hash` and branches as
/// `NODE_PREFIX || left || right`; a node's digest is the hash of its
/// encoding. The distinct prefixes keep leaf and branch digests from ever
/// colliding. Empty subtrees are represented by the all-zero placeholder.
///
/// # Type Parameters
/// * `HASH_SIZE` - The size of the hash digest in bytes
/// * `H` - The hasher used for paths, values and nodes
pub struct TreeHasher<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(PhantomData<H>);

impl<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>> TreeHasher<HASH_SIZE, H> {
    /// Length in bytes of any serialized node.
    pub const ENCODED_LEN: usize = 1 + 2 * HASH_SIZE;

    /// Digest of an empty subtree.
    pub const fn placeholder() -> [u8; HASH_SIZE] {
        [0; HASH_SIZE]
    }

    /// Raw hash of `data`.
    pub fn digest(data: &[u8]) -> [u8; HASH_SIZE] {
        H::hash(data)
    }

    /// Path of `key` in the tree. Keys are only ever hashed here.
    pub fn path(key: &[u8]) -> [u8; HASH_SIZE] {
        H::hash(key)
    }

    pub fn encode_leaf(path: &[u8; HASH_SIZE], value_hash: &[u8; HASH_SIZE]) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(Self::ENCODED_LEN);
        encoded.push(LEAF_PREFIX);
        encoded.extend_from_slice(path);
        encoded.extend_from_slice(value_hash);
        encoded
    }

    pub fn encode_node(left: &[u8; HASH_SIZE], right: &[u8; HASH_SIZE]) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(Self::ENCODED_LEN);
        encoded.push(NODE_PREFIX);
        encoded.extend_from_slice(left);
        encoded.extend_from_slice(right);
        encoded
    }

    /// Digest of the leaf for `path` holding a value hashing to `value_hash`.
    pub fn digest_leaf(path: &[u8; HASH_SIZE], value_hash: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
        H::hash(&Self::encode_leaf(path, value_hash))
    }

    /// Digest of the branch with children `left` and `right`.
    pub fn digest_node(left: &[u8; HASH_SIZE], right: &[u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
        H::hash(&Self::encode_node(left, right))
    }

    /// Whether `data` carries the leaf prefix. No length check is done here.
    pub fn is_leaf(data: &[u8]) -> bool {
        data.first() == Some(&LEAF_PREFIX)
    }

    /// Splits a serialized leaf into its `(path, value_hash)`.
    pub fn parse_leaf(data: &[u8]) -> Result<([u8; HASH_SIZE], [u8; HASH_SIZE]), DecodeError> {
        match Self::split(data)? {
            (LEAF_PREFIX, path, value_hash) => Ok((path, value_hash)),
            _ => Err(DecodeError::ExpectedLeaf),
        }
    }

    /// Splits a serialized branch into its `(left, right)` children.
    pub fn parse_node(data: &[u8]) -> Result<([u8; HASH_SIZE], [u8; HASH_SIZE]), DecodeError> {
        match Self::split(data)? {
            (NODE_PREFIX, left, right) => Ok((left, right)),
            _ => Err(DecodeError::ExpectedBranch),
        }
    }

    /// Decodes a serialized node of either kind.
    pub fn decode(data: &[u8]) -> Result<Node<HASH_SIZE>, DecodeError> {
        match Self::split(data)? {
            (LEAF_PREFIX, path, value_hash) => Ok(Node::Leaf(LeafNode::new(path, value_hash))),
            (_, left, right) => Ok(Node::Branch(Branch::new(left, right))),
        }
    }

    fn split(data: &[u8]) -> Result<(u8, [u8; HASH_SIZE], [u8; HASH_SIZE]), DecodeError> {
        if data.len() != Self::ENCODED_LEN {
            return Err(DecodeError::InvalidLength {
                expected: Self::ENCODED_LEN,
                actual: data.len(),
            });
        }
        let prefix = data[0];
        if prefix != LEAF_PREFIX && prefix != NODE_PREFIX {
            return Err(DecodeError::UnknownPrefix(prefix));
        }
        let mut first = [0u8; HASH_SIZE];
        let mut second = [0u8; HASH_SIZE];
        first.copy_from_slice(&data[1..1 + HASH_SIZE]);
        second.copy_from_slice(&data[1 + HASH_SIZE..]);
        Ok((prefix, first, second))
    }
}
