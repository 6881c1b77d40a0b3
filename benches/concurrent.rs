//! Concurrent operations benchmarks.
//!
//! Measures inserts and queries across threads at two contention levels:
//! every thread on one bucket, and threads spread over distinct lengths.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use shapebloom::sync::{BucketGuard, LockedBitfield, SeqLockBitfield};
use shapebloom::ShapeBloomFilter;
use std::sync::Arc;
use std::thread;

mod common;
use common::{random_u64s, THREAD_COUNTS};

const OPS_PER_THREAD: usize = 10_000;

/// All threads insert `u64`s into the single 8-byte bucket.
fn run_same_bucket<G: BucketGuard>(filter: &Arc<ShapeBloomFilter<G>>, data: &Arc<Vec<Vec<u64>>>) {
    let handles: Vec<_> = (0..data.len())
        .map(|t| {
            let filter = Arc::clone(filter);
            let data = Arc::clone(data);
            thread::spawn(move || {
                for v in &data[t] {
                    filter.insert(black_box(v)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

/// Thread `t` inserts values of width `t + 1` bytes, one bucket each.
fn run_distinct_buckets<G: BucketGuard>(filter: &Arc<ShapeBloomFilter<G>>, threads: usize) {
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let filter = Arc::clone(filter);
            thread::spawn(move || {
                let mut pattern = vec![0u8; t + 1];
                for i in 0..OPS_PER_THREAD {
                    pattern[i % (t + 1)] = i as u8;
                    filter.insert(black_box(&pattern)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn per_thread_data(threads: usize) -> Arc<Vec<Vec<u64>>> {
    Arc::new(
        (0..threads)
            .map(|t| random_u64s(OPS_PER_THREAD, t as u64))
            .collect(),
    )
}

fn bench_same_bucket_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_same_bucket");

    for &threads in &THREAD_COUNTS {
        let data = per_thread_data(threads);
        group.throughput(Throughput::Elements((OPS_PER_THREAD * threads) as u64));

        group.bench_with_input(BenchmarkId::new("rwlock", threads), &data, |b, data| {
            b.iter_batched(
                || Arc::new(ShapeBloomFilter::<LockedBitfield>::default()),
                |filter| {
                    run_same_bucket(&filter, data);
                    filter
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("seqlock", threads), &data, |b, data| {
            b.iter_batched(
                || Arc::new(ShapeBloomFilter::<SeqLockBitfield>::default()),
                |filter| {
                    run_same_bucket(&filter, data);
                    filter
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_distinct_bucket_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_distinct_buckets");

    for &threads in &THREAD_COUNTS {
        group.throughput(Throughput::Elements((OPS_PER_THREAD * threads) as u64));

        group.bench_with_input(BenchmarkId::new("rwlock", threads), &threads, |b, &threads| {
            b.iter_batched(
                || Arc::new(ShapeBloomFilter::<LockedBitfield>::default()),
                |filter| {
                    run_distinct_buckets(&filter, threads);
                    filter
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("seqlock", threads), &threads, |b, &threads| {
            b.iter_batched(
                || Arc::new(ShapeBloomFilter::<SeqLockBitfield>::default()),
                |filter| {
                    run_distinct_buckets(&filter, threads);
                    filter
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Half the threads insert while the other half query the same bucket.
fn mixed_workload<G: BucketGuard>(filter: &Arc<ShapeBloomFilter<G>>, data: &Arc<Vec<Vec<u64>>>) {
    let handles: Vec<_> = (0..data.len())
        .map(|t| {
            let filter = Arc::clone(filter);
            let data = Arc::clone(data);
            thread::spawn(move || {
                if t % 2 == 0 {
                    for v in &data[t] {
                        filter.insert(black_box(v)).unwrap();
                    }
                } else {
                    for v in &data[t] {
                        black_box(filter.possibly_contains(v).unwrap());
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn bench_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_mixed");

    for &threads in THREAD_COUNTS.iter().filter(|&&t| t >= 2) {
        let data = per_thread_data(threads);
        group.throughput(Throughput::Elements((OPS_PER_THREAD * threads) as u64));

        group.bench_with_input(BenchmarkId::new("rwlock", threads), &data, |b, data| {
            let filter = Arc::new(ShapeBloomFilter::<LockedBitfield>::default());
            filter.insert(&0u64).unwrap();
            b.iter(|| mixed_workload(&filter, data));
        });

        group.bench_with_input(BenchmarkId::new("seqlock", threads), &data, |b, data| {
            let filter = Arc::new(ShapeBloomFilter::<SeqLockBitfield>::default());
            filter.insert(&0u64).unwrap();
            b.iter(|| mixed_workload(&filter, data));
        });
    }

    group.finish();
}

#[cfg(feature = "rayon")]
fn bench_par_insert_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("par_insert_batch");
    let values = random_u64s(100_000, 99);
    group.throughput(Throughput::Elements(values.len() as u64));

    group.bench_function("seqlock", |b| {
        b.iter_batched(
            ShapeBloomFilter::optimistic,
            |filter| {
                filter.par_insert_batch(&values).unwrap();
                filter
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

#[cfg(not(feature = "rayon"))]
fn bench_par_insert_batch(_c: &mut Criterion) {}

criterion_group!(
    benches,
    bench_same_bucket_inserts,
    bench_distinct_bucket_inserts,
    bench_mixed_workload,
    bench_par_insert_batch
);
criterion_main!(benches);
