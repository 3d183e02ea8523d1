//! Criterion microbenches for the seeded splitter.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - Fisher-Yates shuffling with the pinned generator
//! - A full train/val/test split of a large item list
//! - Split-size arithmetic

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use cctv_prep::split::shuffle::fisher_yates;
use cctv_prep::split::{DatasetSplitter, SeededSplitter, SplitRatios};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn bench_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("shuffle");

    for size in SIZES {
        let items: Vec<u32> = (0..size as u32).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("fisher_yates", size), &items, |b, items| {
            b.iter(|| {
                let mut items = items.clone();
                fisher_yates(&mut items, black_box(42));
                black_box(items)
            })
        });
    }

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let splitter = SeededSplitter::new(42);
    let mut group = c.benchmark_group("split");

    for size in SIZES {
        let items: Vec<String> = (0..size).map(|i| format!("img_{i:05}.jpg")).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("seeded", size), &items, |b, items| {
            b.iter(|| {
                let partition = splitter
                    .split(items.clone(), black_box(0.7), black_box(0.2))
                    .unwrap();
                black_box(partition)
            })
        });
    }

    group.finish();
}

fn bench_counts(c: &mut Criterion) {
    let ratios = SplitRatios::new(0.7, 0.2).unwrap();

    c.bench_function("split_counts", |b| {
        b.iter(|| {
            for total in 0..1_000 {
                black_box(ratios.counts(black_box(total)));
            }
        })
    });
}

criterion_group!(benches, bench_shuffle, bench_split, bench_counts);
criterion_main!(benches);
