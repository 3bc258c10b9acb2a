//! Core compact Sparse Merkle Tree implementation

use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::{
    db::MapStore,
    node::{Branch, Hasher, LeafNode, Node, TreeHasher},
    Proof, ProofKind, TreeError,
};

use super::{bit_index, count_common_prefix, walk_up, LeafIterator, NodeIterator};

/// Where a descent along a path stopped.
enum Terminal<const HASH_SIZE: usize> {
    /// An empty subtree.
    Empty,
    /// A leaf and its digest. Its path may differ from the one descended.
    Leaf([u8; HASH_SIZE], LeafNode<HASH_SIZE>),
}

/// Result of walking down the tree along a path.
struct Descent<const HASH_SIZE: usize> {
    /// Sibling digests met on the way, from the root down: `side_nodes[d]` is
    /// the sibling at depth `d`.
    side_nodes: Vec<[u8; HASH_SIZE]>,
    terminal: Terminal<HASH_SIZE>,
}

/// Compact sparse merkle tree.
///
/// A subtree holding a single leaf is represented by that leaf, so only
/// `O(n)` nodes are ever materialized for `n` entries and the root only
/// depends on the set of entries.
///
/// * `HASH_SIZE` - size of the hash digest in bytes.
/// * `H` - Hasher used for keys, values and nodes.
/// * `StoreError` - error type shared by the node and value stores.
pub struct SparseMerkleTree<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>, StoreError> {
    nodes: Box<dyn MapStore<Error = StoreError>>,
    values: Box<dyn MapStore<Error = StoreError>>,
    root: [u8; HASH_SIZE],
    _phantom: PhantomData<H>,
}

impl<
        const HASH_SIZE: usize,
        H: Hasher<HASH_SIZE>,
        StoreError: std::fmt::Debug + std::fmt::Display,
    > SparseMerkleTree<HASH_SIZE, H, StoreError>
{
    /// Creates an empty tree backed by the given node and value stores.
    pub fn new(
        nodes: Box<dyn MapStore<Error = StoreError>>,
        values: Box<dyn MapStore<Error = StoreError>>,
    ) -> Self {
        Self::import(nodes, values, TreeHasher::<HASH_SIZE, H>::placeholder())
    }

    /// Binds a tree to stores that already hold a tree with the given root.
    ///
    /// Nothing is checked here; a root whose nodes are missing surfaces as
    /// [`TreeError::MissingNode`] on the first read.
    pub fn import(
        nodes: Box<dyn MapStore<Error = StoreError>>,
        values: Box<dyn MapStore<Error = StoreError>>,
        root: [u8; HASH_SIZE],
    ) -> Self {
        Self {
            nodes,
            values,
            root,
            _phantom: PhantomData,
        }
    }

    /// Max depth of the tree, which is also the max number of side nodes in a proof.
    pub const fn max_depth() -> usize {
        HASH_SIZE * 8
    }

    /// Root digest of the tree.
    pub fn root(&self) -> [u8; HASH_SIZE] {
        self.root
    }

    pub fn nodes(&self) -> &dyn MapStore<Error = StoreError> {
        self.nodes.as_ref()
    }

    pub fn values(&self) -> &dyn MapStore<Error = StoreError> {
        self.values.as_ref()
    }

    /// Gives back the `(nodes, values)` stores.
    pub fn into_stores(
        self,
    ) -> (
        Box<dyn MapStore<Error = StoreError>>,
        Box<dyn MapStore<Error = StoreError>>,
    ) {
        (self.nodes, self.values)
    }

    /// Fetches and decodes the node stored under `digest`.
    fn get_node(&self, digest: &[u8; HASH_SIZE]) -> Result<Node<HASH_SIZE>, TreeError<StoreError>> {
        let bytes = self
            .nodes
            .get(digest)
            .map_err(TreeError::Store)?
            .ok_or_else(|| TreeError::MissingNode(digest.to_vec()))?;
        TreeHasher::<HASH_SIZE, H>::decode(&bytes).map_err(TreeError::Decode)
    }

    /// Walk down the tree from the root along `path` until an empty subtree
    /// or a leaf is reached.
    fn walk_down(
        &self,
        path: &[u8; HASH_SIZE],
    ) -> Result<Descent<HASH_SIZE>, TreeError<StoreError>> {
        let placeholder = TreeHasher::<HASH_SIZE, H>::placeholder();
        let mut side_nodes = Vec::new();
        let mut current = self.root;
        loop {
            if current == placeholder {
                return Ok(Descent {
                    side_nodes,
                    terminal: Terminal::Empty,
                });
            }
            match self.get_node(&current)? {
                Node::Leaf(leaf) => {
                    return Ok(Descent {
                        side_nodes,
                        terminal: Terminal::Leaf(current, leaf),
                    })
                }
                Node::Branch(branch) => {
                    let depth = side_nodes.len();
                    if depth == Self::max_depth() {
                        return Err(TreeError::DepthExceeded);
                    }
                    let (next, sibling) = branch.step(bit_index(depth, path));
                    trace!(
                        target: "smt::tree",
                        depth,
                        node = %hex::encode(current),
                        "descending"
                    );
                    side_nodes.push(sibling);
                    current = next;
                }
            }
        }
    }

    /// Returns the leaf holding `path`, if any.
    fn find_leaf(
        &self,
        path: &[u8; HASH_SIZE],
    ) -> Result<Option<LeafNode<HASH_SIZE>>, TreeError<StoreError>> {
        match self.walk_down(path)?.terminal {
            Terminal::Leaf(_, leaf) if leaf.path() == path => Ok(Some(leaf)),
            _ => Ok(None),
        }
    }

    /// Get the value stored for `key`, or `None` if the key is absent.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, TreeError<StoreError>> {
        let path = TreeHasher::<HASH_SIZE, H>::path(key);
        if self.find_leaf(&path)?.is_none() {
            return Ok(None);
        }
        self.values
            .get(key)
            .map_err(TreeError::Store)?
            .ok_or(TreeError::MissingValue)
            .map(Some)
    }

    /// Whether `key` is present in the tree. Only the node store is read.
    pub fn has(&self, key: &[u8]) -> Result<bool, TreeError<StoreError>> {
        let path = TreeHasher::<HASH_SIZE, H>::path(key);
        Ok(self.find_leaf(&path)?.is_some())
    }

    /// Hash of the value stored for `key`, read from its leaf.
    pub fn get_value_hash(
        &self,
        key: &[u8],
    ) -> Result<Option<[u8; HASH_SIZE]>, TreeError<StoreError>> {
        let path = TreeHasher::<HASH_SIZE, H>::path(key);
        Ok(self.find_leaf(&path)?.map(|leaf| *leaf.value_hash()))
    }

    /// Sets `key` to `value` and returns the new root.
    ///
    /// Nodes are written first, then the value, then the root moves. On
    /// error the root is left untouched; nodes already written stay in the
    /// store unreferenced.
    pub fn update(
        &mut self,
        key: &[u8],
        value: &[u8],
    ) -> Result<[u8; HASH_SIZE], TreeError<StoreError>> {
        let placeholder = TreeHasher::<HASH_SIZE, H>::placeholder();
        let leaf = LeafNode::<HASH_SIZE>::from_entry::<H>(key, value);
        let path = *leaf.path();
        let Descent {
            mut side_nodes,
            terminal,
        } = self.walk_down(&path)?;

        let mut insertions = Vec::with_capacity(side_nodes.len() + 2);
        let mut current = leaf.hash::<H>();
        insertions.push((current, leaf.encode::<H>()));

        if let Terminal::Leaf(other_digest, other) = terminal {
            if other.path() != &path {
                // Both leaves share the subtree we reached, split it at the
                // first diverging bit and fill the gap with single-child branches.
                let reached = side_nodes.len();
                let diverging = count_common_prefix(&path, other.path());
                let branch = Branch::from_child(bit_index(diverging, &path), current, other_digest);
                current = branch.hash::<H>();
                insertions.push((current, branch.encode::<H>()));
                for depth in (reached..diverging).rev() {
                    let branch = Branch::from_child(bit_index(depth, &path), current, placeholder);
                    current = branch.hash::<H>();
                    insertions.push((current, branch.encode::<H>()));
                }
            }
        }

        side_nodes.reverse();
        let root = walk_up::<HASH_SIZE, H>(&path, current, &side_nodes, |_, digest, parent| {
            insertions.push((*digest, parent.encode::<H>()));
        });

        for (digest, encoded) in insertions {
            self.nodes.set(&digest, encoded).map_err(TreeError::Store)?;
        }
        self.values
            .set(key, value.to_vec())
            .map_err(TreeError::Store)?;

        debug!(
            target: "smt::tree",
            old_root = %hex::encode(self.root),
            new_root = %hex::encode(root),
            "updated key"
        );
        self.root = root;
        Ok(root)
    }

    /// Removes `key` from the tree. Returns whether the key was present.
    ///
    /// If the removed leaf leaves a single leaf in its subtree, that leaf is
    /// moved up to the highest position where it has a non-empty sibling.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool, TreeError<StoreError>> {
        let placeholder = TreeHasher::<HASH_SIZE, H>::placeholder();
        let path = TreeHasher::<HASH_SIZE, H>::path(key);
        let Descent {
            side_nodes,
            terminal,
        } = self.walk_down(&path)?;
        match terminal {
            Terminal::Leaf(_, leaf) if leaf.path() == &path => {}
            _ => return Ok(false),
        }

        let mut insertions = Vec::with_capacity(side_nodes.len());
        let mut current = placeholder;
        // `current` is either empty or a lone leaf being carried up.
        let mut hoisting = true;
        for (depth, sibling) in side_nodes.iter().enumerate().rev() {
            if hoisting {
                if *sibling == placeholder {
                    continue;
                }
                if current == placeholder && self.get_node(sibling)?.is_leaf() {
                    trace!(
                        target: "smt::tree",
                        depth,
                        leaf = %hex::encode(sibling),
                        "hoisting leaf"
                    );
                    current = *sibling;
                    continue;
                }
                hoisting = false;
            }
            let branch = Branch::from_child(bit_index(depth, &path), current, *sibling);
            current = branch.hash::<H>();
            insertions.push((current, branch.encode::<H>()));
        }

        for (digest, encoded) in insertions {
            self.nodes.set(&digest, encoded).map_err(TreeError::Store)?;
        }
        self.values.delete(key).map_err(TreeError::Store)?;

        debug!(
            target: "smt::tree",
            old_root = %hex::encode(self.root),
            new_root = %hex::encode(current),
            "deleted key"
        );
        self.root = current;
        Ok(true)
    }

    /// Builds a proof of membership or non-membership of `key` against the current root.
    pub fn prove(&self, key: &[u8]) -> Result<Proof<HASH_SIZE>, TreeError<StoreError>> {
        let path = TreeHasher::<HASH_SIZE, H>::path(key);
        let Descent {
            mut side_nodes,
            terminal,
        } = self.walk_down(&path)?;
        side_nodes.reverse();
        let kind = match terminal {
            Terminal::Empty => ProofKind::NonMembershipEmpty,
            Terminal::Leaf(_, leaf) if leaf.path() == &path => ProofKind::Membership,
            Terminal::Leaf(_, leaf) => ProofKind::NonMembershipConflictingLeaf(leaf),
        };
        debug!(
            target: "smt::proof",
            root = %hex::encode(self.root),
            side_nodes = side_nodes.len(),
            kind = kind.name(),
            "built proof"
        );
        Ok(Proof::new(kind, side_nodes))
    }

    /// Iterates over every node reachable from the current root, in pre-order.
    pub fn iterate(&self) -> NodeIterator<'_, HASH_SIZE, H, StoreError> {
        NodeIterator::new(self.nodes.as_ref(), self.root)
    }

    /// Iterates over the leaves reachable from the current root, left to right.
    pub fn leaves(&self) -> LeafIterator<'_, HASH_SIZE, H, StoreError> {
        self.iterate().leaves()
    }
}
