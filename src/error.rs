//! Error types for the Sparse Merkle Tree implementation

use thiserror::Error;

/// Error type for tree operations.
///
/// Generic over the error type of the backing [`MapStore`](crate::MapStore) so
/// store failures are surfaced unchanged.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TreeError<StoreError> {
    /// The node or value store failed
    #[error("store error: {0}")]
    Store(StoreError),
    /// Stored node bytes could not be decoded
    #[error("corrupted node: {0}")]
    Decode(#[source] DecodeError),
    /// A digest referenced by the tree has no entry in the node store
    #[error("node {} not found in store", hex::encode(.0))]
    MissingNode(Vec<u8>),
    /// A leaf exists for the key but the value store has no entry for it
    #[error("value for an existing leaf is missing from the value store")]
    MissingValue,
    /// An internal node was found where only a leaf or an empty subtree can live
    #[error("internal node found below the maximum tree depth")]
    DepthExceeded,
}

/// Error returned when stored bytes do not match a node encoding.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum DecodeError {
    /// The encoding does not have the size of a node
    #[error("invalid node length {actual}, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },
    /// The first byte is neither the leaf nor the branch prefix
    #[error("unknown node prefix {0:#04x}")]
    UnknownPrefix(u8),
    /// A branch was decoded where a leaf was expected
    #[error("node is not a leaf node")]
    ExpectedLeaf,
    /// A leaf was decoded where a branch was expected
    #[error("node is not a branch node")]
    ExpectedBranch,
}

/// Error returned when decoding or decompressing a serialized proof.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ProofError {
    /// The input ended before the proof was complete
    #[error("proof encoding is truncated")]
    Truncated,
    /// Bytes remain after the last side node
    #[error("{0} trailing bytes after proof")]
    TrailingBytes(usize),
    /// The terminal tag is unknown
    #[error("unknown proof tag {0}")]
    UnknownTag(u8),
    /// The proof is deeper than the tree can be
    #[error("proof holds {0} side nodes, more than the tree depth")]
    TooManySideNodes(usize),
    /// The bitmap does not describe the number of stored side nodes
    #[error("bitmap expects {expected} side nodes but {actual} are present")]
    BitmapMismatch { expected: usize, actual: usize },
}
