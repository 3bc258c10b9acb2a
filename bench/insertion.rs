use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use sha2::Sha256;
use smt::{MemoryStore, MemoryStoreError, SparseMerkleTree};

type Tree = SparseMerkleTree<32, Sha256, MemoryStoreError>;

pub fn generate_random_entry() -> ([u8; 32], Vec<u8>) {
    let key = rand::random::<[u8; 32]>();
    let mut value = Vec::with_capacity(32);
    for _ in 0..32 {
        value.push(rand::random());
    }
    (key, value)
}

fn new_tree() -> Tree {
    Tree::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
}

fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("SMT Insertion");

    group.bench_function("100 entries", |b| {
        b.iter_batched(
            || {
                (0..100)
                    .map(|_| generate_random_entry())
                    .collect::<Vec<_>>()
            },
            |entries| {
                let mut tree = new_tree();
                for (key, value) in &entries {
                    tree.update(key, value).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("100 entries then delete", |b| {
        b.iter_batched(
            || {
                (0..100)
                    .map(|_| generate_random_entry())
                    .collect::<Vec<_>>()
            },
            |entries| {
                let mut tree = new_tree();
                for (key, value) in &entries {
                    tree.update(key, value).unwrap();
                }
                for (key, _) in &entries {
                    tree.delete(key).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_insertion);
criterion_main!(benches);
