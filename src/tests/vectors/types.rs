use serde::{Deserialize, Serialize};

/// A file of test vectors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestVectors {
    pub valid_test_cases: Vec<ValidTestCase>,
}

/// A tree built from a sequence of updates and deletions, with its expected
/// root and proofs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidTestCase {
    pub comment: String,
    /// `(key, value)` pairs applied in order, later pairs overwriting earlier ones
    pub inserts: Vec<(String, String)>,
    /// Keys deleted once every insert has been applied
    pub deletes: Vec<String>,
    pub root: String,
    /// Number of nodes reachable from the root
    pub node_count: usize,
    pub proofs: Vec<TestProof>,
}

impl ValidTestCase {
    /// Value `key` holds once the whole case has been applied.
    pub fn expected_value(&self, key: &str) -> Option<&str> {
        if self.deletes.iter().any(|deleted| deleted == key) {
            return None;
        }
        self.inserts
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn root_as_bytes(&self) -> Result<[u8; 32], Box<dyn std::error::Error>> {
        let bytes = hex::decode(&self.root)?;
        bytes
            .try_into()
            .map_err(|_| "root is not 32 bytes long".into())
    }
}

/// A proof for one key of a test case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestProof {
    pub key: String,
    /// One of `membership`, `non_membership_empty` or `non_membership_conflicting_leaf`
    pub kind: String,
    /// Number of side nodes, empty ones included
    pub side_nodes: usize,
    /// Hex of the compressed proof encoding
    pub compressed: String,
}
