//! Shared data generators and constants for all benchmarks.
//!
//! Generators are seeded ChaCha streams so every run measures the same
//! values.
#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shapebloom::fixed_encode;

/// Fixed seed for reproducible data.
pub const SEED: u64 = 0x5EED_B100;

/// Item counts for throughput benchmarks.
pub const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Thread counts for concurrency benchmarks.
pub const THREAD_COUNTS: [usize; 4] = [1, 2, 4, 8];

/// Twelve-byte record, the common composite shape.
#[derive(Debug, Clone, Copy)]
pub struct Record {
    pub a: i32,
    pub b: u64,
}
fixed_encode!(Record { a, b });

fn rng(stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    rng.set_stream(stream);
    rng
}

/// `count` random `u64` values.
pub fn random_u64s(count: usize, stream: u64) -> Vec<u64> {
    let mut rng = rng(stream);
    (0..count).map(|_| rng.gen()).collect()
}

/// `count` random records.
pub fn random_records(count: usize, stream: u64) -> Vec<Record> {
    let mut rng = rng(stream);
    (0..count)
        .map(|_| Record {
            a: rng.gen(),
            b: rng.gen(),
        })
        .collect()
}

/// `count` small values confined to the low byte, the low-saturation case.
pub fn small_u64s(count: usize, stream: u64) -> Vec<u64> {
    let mut rng = rng(stream);
    (0..count).map(|_| rng.gen_range(0..256)).collect()
}
