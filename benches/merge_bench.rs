//! Benchmarks for chat message reconciliation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use landledger::chat::{merge_sources, ChatMessage};

fn create_messages(count: usize, sender: &str, with_ids: bool) -> Vec<ChatMessage> {
    (0..count)
        .map(|i| ChatMessage {
            id: if with_ids {
                format!("{sender}-{i}")
            } else {
                String::new()
            },
            sender: sender.to_string(),
            content: format!("message number {i}"),
            timestamp: i as i64 * 1_000,
        })
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        // Two disjoint sources, stable ids
        let a = create_messages(size / 2, "0xaa", true);
        let b = create_messages(size / 2, "0xbb", true);
        group.bench_function(format!("disjoint_{}", size), |bench| {
            bench.iter(|| merge_sources([black_box(a.clone()), black_box(b.clone())]))
        });

        // Fully overlapping sources: worst case for the dedup map
        let local = create_messages(size, "0xaa", true);
        let cloud = local.clone();
        group.bench_function(format!("overlap_{}", size), |bench| {
            bench.iter(|| merge_sources([black_box(local.clone()), black_box(cloud.clone())]))
        });

        // Id-less messages force synthetic key hashing
        let hashed = create_messages(size, "0xaa", false);
        group.bench_function(format!("synthetic_keys_{}", size), |bench| {
            bench.iter(|| merge_sources([black_box(hashed.clone())]))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
