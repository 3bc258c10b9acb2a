//! Proofs are used to verify the presence or absence of a key in a tree.
//!
//! A proof is the list of sibling digests on the path of the key, from the
//! bottom of the path up to the root, plus what the path ended on.
//!
//! A proof can be compressed: empty siblings are replaced by set bits in a
//! bitvector.
//!
//! A compressed proof can be encoded to bytes and decoded back.
use std::fmt::Display;

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;

use crate::{count_common_prefix, walk_up, Hasher, LeafNode, ProofError, TreeHasher};

const TAG_MEMBERSHIP: u8 = 0;
const TAG_NON_MEMBERSHIP_EMPTY: u8 = 1;
const TAG_NON_MEMBERSHIP_CONFLICTING_LEAF: u8 = 2;

/// What the path of the proven key ended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofKind<const HASH_SIZE: usize> {
    /// A leaf holding the key
    Membership,
    /// An empty subtree
    NonMembershipEmpty,
    /// A leaf holding another key whose path shares the proof's prefix
    NonMembershipConflictingLeaf(LeafNode<HASH_SIZE>),
}

impl<const HASH_SIZE: usize> ProofKind<HASH_SIZE> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::NonMembershipEmpty => "non_membership_empty",
            Self::NonMembershipConflictingLeaf(_) => "non_membership_conflicting_leaf",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Membership => TAG_MEMBERSHIP,
            Self::NonMembershipEmpty => TAG_NON_MEMBERSHIP_EMPTY,
            Self::NonMembershipConflictingLeaf(_) => TAG_NON_MEMBERSHIP_CONFLICTING_LEAF,
        }
    }
}

/// A merkle proof for a given key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof<const HASH_SIZE: usize> {
    kind: ProofKind<HASH_SIZE>,
    side_nodes: Vec<[u8; HASH_SIZE]>,
}

impl<const HASH_SIZE: usize> Proof<HASH_SIZE> {
    /// Creates a new proof. `side_nodes` go from the bottom of the path to the root.
    pub(crate) fn new(kind: ProofKind<HASH_SIZE>, side_nodes: Vec<[u8; HASH_SIZE]>) -> Self {
        Self { kind, side_nodes }
    }

    pub fn kind(&self) -> &ProofKind<HASH_SIZE> {
        &self.kind
    }

    /// Returns the sibling digests, the first one being the deepest.
    pub fn side_nodes(&self) -> &[[u8; HASH_SIZE]] {
        &self.side_nodes
    }

    /// Computes the root this proof leads to for `key`, with `Some(value)`
    /// claiming membership and `None` claiming absence.
    ///
    /// Returns `None` when the proof cannot back the claim: the terminal
    /// disagrees with it, a conflicting leaf does not sit on the key's path,
    /// or there are more side nodes than the tree is deep.
    pub fn compute_root<H: Hasher<HASH_SIZE>>(
        &self,
        key: &[u8],
        value: Option<&[u8]>,
    ) -> Option<[u8; HASH_SIZE]> {
        if self.side_nodes.len() > HASH_SIZE * 8 {
            return None;
        }
        let path = TreeHasher::<HASH_SIZE, H>::path(key);
        let start = match (value, &self.kind) {
            (Some(value), ProofKind::Membership) => {
                let value_hash = TreeHasher::<HASH_SIZE, H>::digest(value);
                TreeHasher::<HASH_SIZE, H>::digest_leaf(&path, &value_hash)
            }
            (None, ProofKind::NonMembershipEmpty) => TreeHasher::<HASH_SIZE, H>::placeholder(),
            (None, ProofKind::NonMembershipConflictingLeaf(leaf)) => {
                if leaf.path() == &path
                    || count_common_prefix(leaf.path(), &path) < self.side_nodes.len()
                {
                    return None;
                }
                leaf.hash::<H>()
            }
            _ => return None,
        };
        Some(walk_up::<HASH_SIZE, H>(
            &path,
            start,
            &self.side_nodes,
            |_, _, _| {},
        ))
    }

    /// Verify the proof for `key` against `root`.
    ///
    /// # Arguments
    ///
    /// * `root` - The expected root of the tree
    /// * `key` - The key the proof is about
    /// * `value` - `Some(value)` to check that `key` holds `value`, `None` to check that
    ///   `key` is absent
    ///
    /// # Returns
    ///
    /// Returns `true` if the proof is valid for the claim, `false` otherwise.
    pub fn verify<H: Hasher<HASH_SIZE>>(
        &self,
        root: &[u8; HASH_SIZE],
        key: &[u8],
        value: Option<&[u8]>,
    ) -> bool {
        self.compute_root::<H>(key, value).as_ref() == Some(root)
    }

    /// Compresses the proof into a compressed proof.
    pub fn compress(&self) -> CompressedProof<HASH_SIZE> {
        let placeholder = [0u8; HASH_SIZE];
        let mut bits = BitVec::with_capacity(self.side_nodes.len());
        let mut side_nodes = Vec::new();
        for node in self.side_nodes.iter() {
            if *node == placeholder {
                bits.push(true);
            } else {
                bits.push(false);
                side_nodes.push(*node);
            }
        }
        CompressedProof {
            kind: self.kind,
            side_nodes,
            bits,
        }
    }

    /// Encodes the proof in its compressed form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.compress().encode()
    }

    /// Decodes a proof produced by [`Proof::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProofError> {
        CompressedProof::decode(data)?.decompress()
    }
}

impl<const HASH_SIZE: usize> Display for Proof<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Proof {{ kind: {}", self.kind.name())?;
        if let ProofKind::NonMembershipConflictingLeaf(leaf) = &self.kind {
            write!(f, ", leaf: {}", leaf)?;
        }
        write!(f, ", side_nodes: [")?;
        for (i, node) in self.side_nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", hex::encode(node))?;
        }
        write!(f, "] }}")
    }
}

/// Verify `proof` for `key` against `root`. `Some(value)` claims membership
/// and `None` claims absence. Malformed proofs are rejected, never panicked on.
pub fn verify_proof<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(
    proof: &Proof<HASH_SIZE>,
    root: &[u8; HASH_SIZE],
    key: &[u8],
    value: Option<&[u8]>,
) -> bool {
    proof.verify::<H>(root, key, value)
}

/// A compressed merkle proof for a given key.
/// We don't store the side nodes that are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedProof<const HASH_SIZE: usize> {
    kind: ProofKind<HASH_SIZE>,
    side_nodes: Vec<[u8; HASH_SIZE]>,
    /// One bit per side node, set when the side node is empty.
    bits: BitVec<u8, Lsb0>,
}

impl<const HASH_SIZE: usize> CompressedProof<HASH_SIZE> {
    /// Decompresses the proof into a proof.
    pub fn decompress(&self) -> Result<Proof<HASH_SIZE>, ProofError> {
        if self.bits.len() > HASH_SIZE * 8 {
            return Err(ProofError::TooManySideNodes(self.bits.len()));
        }
        let expected = self.bits.count_zeros();
        if self.side_nodes.len() != expected {
            return Err(ProofError::BitmapMismatch {
                expected,
                actual: self.side_nodes.len(),
            });
        }
        let mut stored = self.side_nodes.iter();
        let mut side_nodes = Vec::with_capacity(self.bits.len());
        for empty in self.bits.iter().by_vals() {
            if empty {
                side_nodes.push([0u8; HASH_SIZE]);
            } else if let Some(node) = stored.next() {
                side_nodes.push(*node);
            }
        }
        Ok(Proof::new(self.kind, side_nodes))
    }

    /// Encodes the proof into a byte vector.
    ///
    /// Layout: tag, the conflicting leaf's path and value hash if any, the
    /// number of side nodes as a big-endian `u16`, the bitmap, and the non
    /// empty side nodes.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(
            1 + 2 * HASH_SIZE + 2 + self.bits.len().div_ceil(8) + self.side_nodes.len() * HASH_SIZE,
        );
        encoded.push(self.kind.tag());
        if let ProofKind::NonMembershipConflictingLeaf(leaf) = &self.kind {
            encoded.extend_from_slice(leaf.path());
            encoded.extend_from_slice(leaf.value_hash());
        }
        encoded.extend_from_slice(&(self.bits.len() as u16).to_be_bytes());
        // padding bits of the last bitmap byte are always zero
        let mut bitmap = BitVec::<u8, Lsb0>::repeat(false, self.bits.len().div_ceil(8) * 8);
        bitmap[..self.bits.len()].copy_from_bitslice(&self.bits);
        encoded.extend_from_slice(bitmap.as_raw_slice());
        for node in self.side_nodes.iter() {
            encoded.extend_from_slice(node);
        }
        encoded
    }

    /// Decodes a proof from a byte vector.
    pub fn decode(data: &[u8]) -> Result<Self, ProofError> {
        let mut reader = Reader { data };
        let kind = match reader.take(1)?[0] {
            TAG_MEMBERSHIP => ProofKind::Membership,
            TAG_NON_MEMBERSHIP_EMPTY => ProofKind::NonMembershipEmpty,
            TAG_NON_MEMBERSHIP_CONFLICTING_LEAF => {
                let path = reader.take_digest::<HASH_SIZE>()?;
                let value_hash = reader.take_digest::<HASH_SIZE>()?;
                ProofKind::NonMembershipConflictingLeaf(LeafNode::new(path, value_hash))
            }
            tag => return Err(ProofError::UnknownTag(tag)),
        };
        let count = u16::from_be_bytes([reader.take(1)?[0], reader.take(1)?[0]]) as usize;
        if count > HASH_SIZE * 8 {
            return Err(ProofError::TooManySideNodes(count));
        }
        let mut bits = BitVec::<u8, Lsb0>::from_slice(reader.take(count.div_ceil(8))?);
        bits.truncate(count);
        let mut side_nodes = Vec::with_capacity(bits.count_zeros());
        for _ in 0..bits.count_zeros() {
            side_nodes.push(reader.take_digest::<HASH_SIZE>()?);
        }
        if !reader.data.is_empty() {
            return Err(ProofError::TrailingBytes(reader.data.len()));
        }
        Ok(Self {
            kind,
            side_nodes,
            bits,
        })
    }
}

/// Cursor over the bytes of an encoded proof.
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], ProofError> {
        if self.data.len() < len {
            return Err(ProofError::Truncated);
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    fn take_digest<const HASH_SIZE: usize>(&mut self) -> Result<[u8; HASH_SIZE], ProofError> {
        let mut digest = [0u8; HASH_SIZE];
        digest.copy_from_slice(self.take(HASH_SIZE)?);
        Ok(digest)
    }
}
