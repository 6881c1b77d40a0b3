//! A single length bucket: one bitfield, its guard, and its counters.

use crate::sync::BucketGuard;
use crate::util::AtomicCounter;
use std::fmt;

/// Accumulated bitfield for every inserted value of one encoded length.
///
/// Created lazily by the [`BucketStore`](super::BucketStore) on the first
/// insert of its length and never removed. Bits are only ever set.
pub struct Bucket<G> {
    length: usize,
    bits: G,
    inserts: AtomicCounter,

    #[cfg(feature = "metrics")]
    queries: AtomicCounter,

    #[cfg(feature = "metrics")]
    positives: AtomicCounter,
}

impl<G: BucketGuard> Bucket<G> {
    pub(crate) fn new(length: usize) -> Self {
        Self {
            length,
            bits: G::zeroed(length),
            inserts: AtomicCounter::new(0),
            #[cfg(feature = "metrics")]
            queries: AtomicCounter::new(0),
            #[cfg(feature = "metrics")]
            positives: AtomicCounter::new(0),
        }
    }

    /// Encoded length this bucket holds, in bytes.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Inserts that landed in this bucket.
    #[must_use]
    pub fn inserts(&self) -> u64 {
        self.inserts.get()
    }

    /// Consistent copy of the bitfield.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.bits.snapshot()
    }

    /// OR one encoded value into the bitfield.
    pub(crate) fn merge(&self, pattern: &[u8]) {
        debug_assert_eq!(pattern.len(), self.length);
        self.bits.merge(pattern);
        self.inserts.increment();
    }

    /// OR a whole bitfield in, crediting `inserts` values to this bucket.
    pub(crate) fn absorb(&self, bits: &[u8], inserts: u64) {
        debug_assert_eq!(bits.len(), self.length);
        self.bits.merge(bits);
        self.inserts.add(inserts);
    }

    /// Whether every bit of `pattern` is set.
    pub(crate) fn covers(&self, pattern: &[u8]) -> bool {
        debug_assert_eq!(pattern.len(), self.length);
        let hit = self.bits.covers(pattern);

        #[cfg(feature = "metrics")]
        {
            self.queries.increment();
            if hit {
                self.positives.increment();
            }
        }

        hit
    }

    /// Collect statistics for this bucket.
    #[must_use]
    pub fn stats(&self) -> BucketStats {
        let ones = self.bits.count_ones();
        let total_bits = self.length * 8;
        BucketStats {
            length: self.length,
            inserts: self.inserts(),
            ones,
            saturation: if total_bits == 0 {
                0.0
            } else {
                ones as f64 / total_bits as f64
            },
            #[cfg(feature = "metrics")]
            queries: self.queries.get(),
            #[cfg(feature = "metrics")]
            positives: self.positives.get(),
            #[cfg(feature = "metrics")]
            contention: self.bits.contention(),
        }
    }
}

impl<G: BucketGuard> fmt::Debug for Bucket<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("length", &self.length)
            .field("inserts", &self.inserts())
            .field("strategy", &G::STRATEGY)
            .finish()
    }
}

/// Point-in-time statistics for one bucket.
///
/// `saturation` is the fraction of set bits. A bucket near 1.0 answers
/// "possibly present" for almost any value of its length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BucketStats {
    /// Encoded length in bytes.
    pub length: usize,

    /// Inserts that landed in this bucket.
    pub inserts: u64,

    /// Set bits in the bitfield.
    pub ones: usize,

    /// `ones / (length * 8)`, or 0.0 for the zero-length bucket.
    pub saturation: f64,

    /// Queries answered by this bucket (requires `metrics` feature).
    #[cfg(feature = "metrics")]
    pub queries: u64,

    /// Queries answered "possibly present" (requires `metrics` feature).
    #[cfg(feature = "metrics")]
    pub positives: u64,

    /// Waits or retries in the bucket's guard (requires `metrics` feature).
    #[cfg(feature = "metrics")]
    pub contention: u64,
}
