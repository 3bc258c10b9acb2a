use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sha2::Sha256;
use smt::{verify_proof, MemoryStore, MemoryStoreError, Proof, SparseMerkleTree};

type Tree = SparseMerkleTree<32, Sha256, MemoryStoreError>;

pub fn generate_random_entry() -> ([u8; 32], Vec<u8>) {
    let key = rand::random::<[u8; 32]>();
    let mut value = Vec::with_capacity(32);
    for _ in 0..32 {
        value.push(rand::random());
    }
    (key, value)
}

fn setup_tree(num_entries: usize) -> (Tree, Vec<([u8; 32], Vec<u8>)>) {
    let mut tree = Tree::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()));
    let mut entries = Vec::with_capacity(num_entries);
    for _ in 0..num_entries {
        let (key, value) = generate_random_entry();
        tree.update(&key, &value).unwrap();
        entries.push((key, value));
    }
    (tree, entries)
}

fn bench_proof_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("SMT Proof Generation");

    // Setup a tree with 100 entries
    let (tree, entries) = setup_tree(100);

    group.bench_function("Membership", |b| {
        b.iter(|| {
            for (key, _) in &entries {
                black_box(tree.prove(key)).unwrap();
            }
        })
    });

    group.bench_function("Non membership", |b| {
        b.iter(|| {
            for _ in 0..entries.len() {
                black_box(tree.prove(&rand::random::<[u8; 32]>())).unwrap();
            }
        })
    });

    group.finish();
}

fn bench_proof_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("SMT Proof Verification");

    let (tree, entries) = setup_tree(100);
    let root = tree.root();
    let proofs: Vec<_> = entries
        .iter()
        .map(|(key, _)| tree.prove(key).unwrap())
        .collect();

    group.bench_function("Membership", |b| {
        b.iter(|| {
            for ((key, value), proof) in entries.iter().zip(proofs.iter()) {
                assert!(black_box(verify_proof::<32, Sha256>(
                    proof,
                    &root,
                    key,
                    Some(value.as_slice())
                )));
            }
        })
    });

    let encoded: Vec<_> = proofs.iter().map(Proof::to_bytes).collect();
    group.bench_function("Decode and verify", |b| {
        b.iter(|| {
            for ((key, value), bytes) in entries.iter().zip(encoded.iter()) {
                let proof = Proof::<32>::from_bytes(bytes).unwrap();
                assert!(black_box(proof.verify::<Sha256>(
                    &root,
                    key,
                    Some(value.as_slice())
                )));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_proof_generation, bench_proof_verification);
criterion_main!(benches);
