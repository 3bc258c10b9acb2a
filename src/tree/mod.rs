mod iter;
mod sparse;

pub use iter::{LeafIterator, NodeEntry, NodeIterator};
pub use sparse::SparseMerkleTree;

use crate::{Branch, Hasher};

/// Get the bit at the given index in the path, most significant bit first.
pub fn bit_index(index: usize, path: &[u8]) -> u8 {
    // `index / 8` selects the byte, `7 - index % 8` the bit inside it counting
    // from the most significant one.
    (path[index / 8] >> (7 - index % 8)) & 1
}

/// Number of leading bits `a` and `b` have in common.
pub fn count_common_prefix<const HASH_SIZE: usize>(
    a: &[u8; HASH_SIZE],
    b: &[u8; HASH_SIZE],
) -> usize {
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = x ^ y;
        if diff != 0 {
            return i * 8 + diff.leading_zeros() as usize;
        }
    }
    HASH_SIZE * 8
}

/// Walk up the tree from a node to the root.
/// * `path` - path of the key we come from.
/// * `start` - digest of the subtree at the bottom of the walk.
/// * `side_nodes` - All the sibling digests on the path, from the bottom of the walk to the root.
///   The sibling at index `i` lives at depth `side_nodes.len() - 1 - i`.
/// * `for_each` - Closure that is executed at each step of the traversal of the tree.
///     * `depth: usize` - depth of the parent in the tree
///     * `digest: &[u8; HASH_SIZE]` - digest of the parent
///     * `parent: &Branch<HASH_SIZE>` - the parent built at this step
pub fn walk_up<const HASH_SIZE: usize, H: Hasher<HASH_SIZE>>(
    path: &[u8; HASH_SIZE],
    start: [u8; HASH_SIZE],
    side_nodes: &[[u8; HASH_SIZE]],
    mut for_each: impl FnMut(usize, &[u8; HASH_SIZE], &Branch<HASH_SIZE>),
) -> [u8; HASH_SIZE] {
    let mut current = start;
    for (i, sibling) in side_nodes.iter().enumerate() {
        let depth = side_nodes.len() - 1 - i;
        let parent = Branch::from_child(bit_index(depth, path), current, *sibling);
        current = parent.hash::<H>();
        for_each(depth, &current, &parent);
    }
    current
}

#[cfg(test)]
mod test {
    use sha2::Sha256;

    use super::{bit_index, count_common_prefix, walk_up};
    use crate::TreeHasher;

    #[test]
    fn test_bit_index() {
        let path = [0b1000_0001, 0b0100_0000];
        assert_eq!(bit_index(0, &path), 1);
        assert_eq!(bit_index(1, &path), 0);
        assert_eq!(bit_index(7, &path), 1);
        assert_eq!(bit_index(8, &path), 0);
        assert_eq!(bit_index(9, &path), 1);
        assert_eq!(bit_index(15, &path), 0);
    }

    #[test]
    fn test_count_common_prefix() {
        assert_eq!(count_common_prefix(&[0u8; 4], &[0u8; 4]), 32);
        assert_eq!(count_common_prefix(&[0x80, 0, 0, 0], &[0, 0, 0, 0]), 0);
        assert_eq!(
            count_common_prefix(&[0xff, 0x01, 0, 0], &[0xff, 0x00, 0, 0]),
            15
        );
        assert_eq!(
            count_common_prefix(&[0xff, 0xff, 0x20, 0], &[0xff, 0xff, 0x30, 0]),
            19
        );
    }

    #[test]
    fn test_walk_up_orders_children_by_path() {
        type Th = TreeHasher<32, Sha256>;
        let start = [1u8; 32];
        let sibling_low = [2u8; 32];
        let sibling_high = [3u8; 32];
        // bit 0 is 1, bit 1 is 0
        let mut path = [0u8; 32];
        path[0] = 0b1000_0000;

        let mut depths = Vec::new();
        let root =
            walk_up::<32, Sha256>(&path, start, &[sibling_low, sibling_high], |depth, _, _| {
                depths.push(depth)
            });
        let expected = Th::digest_node(&sibling_high, &Th::digest_node(&start, &sibling_low));
        assert_eq!(root, expected);
        assert_eq!(depths, vec![1, 0]);
    }

    #[test]
    fn test_walk_up_without_side_nodes() {
        let root = walk_up::<32, Sha256>(&[0; 32], [7; 32], &[], |_, _, _| {
            panic!("no parent should be built")
        });
        assert_eq!(root, [7; 32]);
    }
}
