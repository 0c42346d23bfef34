//! B+ tree benchmarks: insertion order and capacity against lookup cost.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use bplus_index::BPlusTree;

const COUNT: u64 = 10_000;

/// Deterministic permutation of `0..COUNT` (COUNT + 7 is prime).
fn shuffled_keys() -> Vec<u64> {
    let modulus = COUNT + 7;
    (0..modulus)
        .map(|i| (i * 7919) % modulus)
        .filter(|&k| k < COUNT)
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_insert");
    group.throughput(Throughput::Elements(COUNT));

    for capacity in [4usize, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("sequential", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let mut tree = BPlusTree::new(capacity).unwrap();
                    for key in 0..COUNT {
                        tree.insert(key, key);
                    }
                    tree
                });
            },
        );

        let keys = shuffled_keys();
        group.bench_with_input(
            BenchmarkId::new("random", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let mut tree = BPlusTree::new(capacity).unwrap();
                    for &key in &keys {
                        tree.insert(key, key);
                    }
                    tree
                });
            },
        );
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree_search");

    for capacity in [4usize, 16, 64] {
        let mut tree = BPlusTree::new(capacity).unwrap();
        for key in shuffled_keys() {
            tree.insert(key, key);
        }

        group.bench_with_input(BenchmarkId::new("hit", capacity), &tree, |b, tree| {
            let mut key = 0;
            b.iter(|| {
                key = (key + 7919) % COUNT;
                black_box(tree.search(&key))
            });
        });

        group.bench_with_input(BenchmarkId::new("miss", capacity), &tree, |b, tree| {
            b.iter(|| black_box(tree.search(&(COUNT + 1))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_search);
criterion_main!(benches);
