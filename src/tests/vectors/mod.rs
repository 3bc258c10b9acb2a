use std::fs;

mod types;

use sha2::Sha256;

use crate::{
    tests::vectors::types::TestVectors, verify_proof, MemoryStore, MemoryStoreError, Proof,
    SparseMerkleTree,
};

fn run_test_vectors(test_vectors: &TestVectors) {
    for case in &test_vectors.valid_test_cases {
        println!("Running test case: {}", case.comment);

        let mut tree = SparseMerkleTree::<32, Sha256, MemoryStoreError>::new(
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
        );
        for (key, value) in &case.inserts {
            tree.update(key.as_bytes(), value.as_bytes()).unwrap();
        }
        for key in &case.deletes {
            assert!(
                tree.delete(key.as_bytes()).unwrap(),
                "{}: {key} was present",
                case.comment
            );
        }

        let root = case.root_as_bytes().unwrap();
        assert_eq!(tree.root(), root, "{}: root", case.comment);
        assert_eq!(
            tree.iterate().collect::<Result<Vec<_>, _>>().unwrap().len(),
            case.node_count,
            "{}: node count",
            case.comment
        );

        for proof_case in &case.proofs {
            let key = proof_case.key.as_bytes();
            let value = case.expected_value(&proof_case.key);
            assert_eq!(
                tree.get(key).unwrap().as_deref(),
                value.map(str::as_bytes),
                "{}: get {}",
                case.comment,
                proof_case.key
            );

            let proof = tree.prove(key).unwrap();
            assert_eq!(proof.kind().name(), proof_case.kind);
            assert_eq!(proof.side_nodes().len(), proof_case.side_nodes);
            assert_eq!(hex::encode(proof.to_bytes()), proof_case.compressed);

            let decoded =
                Proof::<32>::from_bytes(&hex::decode(&proof_case.compressed).unwrap()).unwrap();
            assert_eq!(decoded, proof);
            assert!(
                verify_proof::<32, Sha256>(&decoded, &root, key, value.map(str::as_bytes)),
                "{}: proof of {}",
                case.comment,
                proof_case.key
            );
        }
    }
}

#[test]
fn test_smt_vectors() {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/src/tests/vectors/testdata/smt_vectors.json"
    );
    let json = fs::read_to_string(path).unwrap();
    let test_vectors = serde_json::from_str::<TestVectors>(&json).unwrap();
    assert_eq!(test_vectors.valid_test_cases.len(), 6);
    run_test_vectors(&test_vectors);
}
