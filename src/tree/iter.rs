//! Pre-order traversal over the nodes materialized in a node store.

use std::cmp::Ordering;
use std::fmt::Display;
use std::marker::PhantomData;

use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;
use bitvec::view::BitView;

use crate::{
    db::MapStore,
    node::{Branch, Hasher, LeafNode, Node, TreeHasher},
    Proof, ProofKind, TreeError,
};

/// A node visited by a [`NodeIterator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry<const HASH_SIZE: usize> {
    digest: [u8; HASH_SIZE],
    parent: [u8; HASH_SIZE],
    path: BitVec<u8, Msb0>,
    side_nodes: Vec<[u8; HASH_SIZE]>,
    node: Node<HASH_SIZE>,
}

impl<const HASH_SIZE: usize> NodeEntry<HASH_SIZE> {
    pub fn digest(&self) -> &[u8; HASH_SIZE] {
        &self.digest
    }

    /// Depth of the node, the root being at depth 0.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Digest of the parent node, the placeholder for the root.
    pub fn parent(&self) -> &[u8; HASH_SIZE] {
        &self.parent
    }

    /// Bits taken from the root to reach the node, `1` going right.
    pub fn path(&self) -> &BitSlice<u8, Msb0> {
        &self.path
    }

    /// Siblings met from the root down to the node.
    pub fn side_nodes(&self) -> &[[u8; HASH_SIZE]] {
        &self.side_nodes
    }

    pub fn node(&self) -> &Node<HASH_SIZE> {
        &self.node
    }

    /// Membership proof of the leaf against the root the iterator started
    /// from. `None` for branches.
    pub fn leaf_proof(&self) -> Option<Proof<HASH_SIZE>> {
        match self.node {
            Node::Leaf(_) => Some(Proof::new(
                ProofKind::Membership,
                self.side_nodes.iter().rev().copied().collect(),
            )),
            Node::Branch(_) => None,
        }
    }
}

impl<const HASH_SIZE: usize> Display for NodeEntry<HASH_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (depth {}, parent {})",
            hex::encode(self.digest),
            self.node,
            self.depth(),
            hex::encode(self.parent)
        )
    }
}

/// A node waiting on the stack.
struct Frame<const HASH_SIZE: usize> {
    digest: [u8; HASH_SIZE],
    parent: [u8; HASH_SIZE],
    path: BitVec<u8, Msb0>,
    side_nodes: Vec<[u8; HASH_SIZE]>,
}

/// Depth-first pre-order iterator over the nodes reachable from a root.
///
/// Placeholders are never yielded. A store or decode failure is yielded once
/// as an `Err`, after which the iterator is exhausted.
pub struct NodeIterator<'a, const HASH_SIZE: usize, H: Hasher<HASH_SIZE>, StoreError> {
    nodes: &'a dyn MapStore<Error = StoreError>,
    /// Pending nodes, the next one on top.
    stack: Vec<Frame<HASH_SIZE>>,
    /// Children pushed by the last visited node.
    pushed: usize,
    _phantom: PhantomData<H>,
}

impl<
        'a,
        const HASH_SIZE: usize,
        H: Hasher<HASH_SIZE>,
        StoreError: std::fmt::Debug + std::fmt::Display,
    > NodeIterator<'a, HASH_SIZE, H, StoreError>
{
    /// Iterates from `root`, which can be any root whose nodes are still in `nodes`.
    pub fn new(nodes: &'a dyn MapStore<Error = StoreError>, root: [u8; HASH_SIZE]) -> Self {
        let placeholder = TreeHasher::<HASH_SIZE, H>::placeholder();
        let stack = if root == placeholder {
            Vec::new()
        } else {
            vec![Frame {
                digest: root,
                parent: placeholder,
                path: BitVec::new(),
                side_nodes: Vec::new(),
            }]
        };
        Self {
            nodes,
            stack,
            pushed: 0,
            _phantom: PhantomData,
        }
    }

    /// Only keep the leaves.
    pub fn leaves(self) -> LeafIterator<'a, HASH_SIZE, H, StoreError> {
        LeafIterator { inner: self }
    }

    /// Do not descend into the node returned by the last call to `next`.
    pub fn skip_children(&mut self) {
        self.stack.truncate(self.stack.len() - self.pushed);
        self.pushed = 0;
    }

    /// Moves forward to the first node whose subtree holds paths at or after
    /// `start`. Branches lying above `start` are opened without being yielded.
    pub fn seek(&mut self, start: &[u8; HASH_SIZE]) -> Result<(), TreeError<StoreError>> {
        let result = self.seek_from(start);
        self.pushed = 0;
        if result.is_err() {
            self.stack.clear();
        }
        result
    }

    fn seek_from(&mut self, start: &[u8; HASH_SIZE]) -> Result<(), TreeError<StoreError>> {
        let target = start.as_slice().view_bits::<Msb0>();
        while let Some(frame) = self.stack.pop() {
            let depth = frame.path.len();
            match frame.path.as_bitslice().cmp(&target[..depth]) {
                Ordering::Less => continue,
                Ordering::Greater => {
                    self.stack.push(frame);
                    return Ok(());
                }
                Ordering::Equal => {}
            }
            match self.fetch(&frame.digest)? {
                Node::Leaf(leaf) => {
                    if leaf.path() >= start {
                        self.stack.push(frame);
                        return Ok(());
                    }
                }
                Node::Branch(branch) => self.expand(&frame, &branch)?,
            }
        }
        Ok(())
    }

    fn fetch(&self, digest: &[u8; HASH_SIZE]) -> Result<Node<HASH_SIZE>, TreeError<StoreError>> {
        let bytes = self
            .nodes
            .get(digest)
            .map_err(TreeError::Store)?
            .ok_or_else(|| TreeError::MissingNode(digest.to_vec()))?;
        TreeHasher::<HASH_SIZE, H>::decode(&bytes).map_err(TreeError::Decode)
    }

    /// Pushes the non-empty children of `branch`.
    fn expand(
        &mut self,
        frame: &Frame<HASH_SIZE>,
        branch: &Branch<HASH_SIZE>,
    ) -> Result<(), TreeError<StoreError>> {
        if frame.path.len() >= HASH_SIZE * 8 {
            return Err(TreeError::DepthExceeded);
        }
        let placeholder = TreeHasher::<HASH_SIZE, H>::placeholder();
        self.pushed = 0;
        // right first so that the left child is visited first
        let children = [
            (true, branch.right(), branch.left()),
            (false, branch.left(), branch.right()),
        ];
        for (bit, child, sibling) in children {
            if *child == placeholder {
                continue;
            }
            let mut path = frame.path.clone();
            path.push(bit);
            let mut side_nodes = frame.side_nodes.clone();
            side_nodes.push(*sibling);
            self.stack.push(Frame {
                digest: *child,
                parent: frame.digest,
                path,
                side_nodes,
            });
            self.pushed += 1;
        }
        Ok(())
    }

    fn visit(
        &mut self,
        frame: Frame<HASH_SIZE>,
    ) -> Result<NodeEntry<HASH_SIZE>, TreeError<StoreError>> {
        let node = self.fetch(&frame.digest)?;
        if let Node::Branch(branch) = &node {
            self.expand(&frame, branch)?;
        }
        Ok(NodeEntry {
            digest: frame.digest,
            parent: frame.parent,
            path: frame.path,
            side_nodes: frame.side_nodes,
            node,
        })
    }
}

impl<
        const HASH_SIZE: usize,
        H: Hasher<HASH_SIZE>,
        StoreError: std::fmt::Debug + std::fmt::Display,
    > Iterator for NodeIterator<'_, HASH_SIZE, H, StoreError>
{
    type Item = Result<NodeEntry<HASH_SIZE>, TreeError<StoreError>>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.stack.pop()?;
        self.pushed = 0;
        let entry = self.visit(frame);
        if entry.is_err() {
            self.stack.clear();
            self.pushed = 0;
        }
        Some(entry)
    }
}

/// Iterator over the leaves reachable from a root, left to right.
pub struct LeafIterator<'a, const HASH_SIZE: usize, H: Hasher<HASH_SIZE>, StoreError> {
    inner: NodeIterator<'a, HASH_SIZE, H, StoreError>,
}

impl<
        const HASH_SIZE: usize,
        H: Hasher<HASH_SIZE>,
        StoreError: std::fmt::Debug + std::fmt::Display,
    > LeafIterator<'_, HASH_SIZE, H, StoreError>
{
    /// Skips the leaves whose path sorts before `start`.
    pub fn seek(&mut self, start: &[u8; HASH_SIZE]) -> Result<(), TreeError<StoreError>> {
        self.inner.seek(start)
    }
}

impl<
        const HASH_SIZE: usize,
        H: Hasher<HASH_SIZE>,
        StoreError: std::fmt::Debug + std::fmt::Display,
    > Iterator for LeafIterator<'_, HASH_SIZE, H, StoreError>
{
    type Item = Result<LeafNode<HASH_SIZE>, TreeError<StoreError>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if let Node::Leaf(leaf) = entry.node {
                        return Some(Ok(leaf));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
