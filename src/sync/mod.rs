//! Per-bucket concurrency guards.
//!
//! Every bucket owns one bitfield and one guard, so inserts and queries on
//! buckets of different lengths never contend. Within a bucket the guard
//! serializes writers and keeps readers from observing a half-applied OR.
//!
//! # Strategies
//!
//! - [`LockedBitfield`] - `parking_lot::RwLock` per bucket. Write mode for
//!   inserts, read mode for queries. The default.
//! - [`SeqLockBitfield`] - Lock-free optimistic protocol over an atomic
//!   version counter. Writers commit by compare-and-swap and retry on
//!   conflict; readers validate the version and retry if it moved.
//!
//! ## Locking Protocol
//!
//! | Operation   | `LockedBitfield`   | `SeqLockBitfield`                          |
//! |-------------|--------------------|--------------------------------------------|
//! | `merge()`   | Write lock         | CAS even version to odd, OR, publish even  |
//! | `covers()`  | Read lock          | Read, validate version, retry on change    |
//! | `snapshot()`| Read lock          | Copy, validate version, retry on change    |
//!
//! Both preserve every merged bit: two concurrent merges into the same
//! bucket are totally ordered and neither overwrites the other.
//!
//! # Examples
//!
//! ```
//! use shapebloom::sync::{BucketGuard, LockedBitfield, SeqLockBitfield};
//!
//! fn exercise<G: BucketGuard>() {
//!     let bits = G::zeroed(2);
//!     bits.merge(&[0b0001, 0b1000]);
//!     bits.merge(&[0b0010, 0b0000]);
//!     assert_eq!(bits.snapshot(), vec![0b0011, 0b1000]);
//!     assert!(bits.covers(&[0b0011, 0b0000]));
//!     assert!(!bits.covers(&[0b0100, 0b0000]));
//! }
//!
//! exercise::<LockedBitfield>();
//! exercise::<SeqLockBitfield>();
//! ```

mod locked;
mod seqlock;

pub use locked::LockedBitfield;
pub use seqlock::SeqLockBitfield;

/// A fixed-length bitfield guarded for concurrent OR-accumulation.
///
/// Callers pass patterns whose length equals [`len`](Self::len); the bucket
/// store guarantees this by keying buckets on pattern length.
pub trait BucketGuard: Send + Sync + 'static {
    /// Short strategy name, used in logs and `Debug` output.
    const STRATEGY: &'static str;

    /// Allocate an all-zero bitfield of `len` bytes.
    fn zeroed(len: usize) -> Self
    where
        Self: Sized;

    /// Bitfield length in bytes. Never changes.
    fn len(&self) -> usize;

    /// Whether the bitfield has zero length.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// OR `pattern` into the bitfield as one exclusive write.
    fn merge(&self, pattern: &[u8]);

    /// Whether every bit set in `pattern` is set in the bitfield.
    #[must_use]
    fn covers(&self, pattern: &[u8]) -> bool;

    /// Consistent copy of the bitfield.
    #[must_use]
    fn snapshot(&self) -> Vec<u8>;

    /// Number of set bits.
    #[must_use]
    fn count_ones(&self) -> usize {
        self.snapshot()
            .iter()
            .map(|byte| byte.count_ones() as usize)
            .sum()
    }

    /// Times an operation had to wait or retry (requires `metrics` feature).
    #[cfg(feature = "metrics")]
    #[must_use]
    fn contention(&self) -> u64;
}

/// `dst[i] |= src[i]` for every index.
#[inline]
pub(crate) fn or_into(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len(), "pattern length must match bucket");
    for (d, s) in dst.iter_mut().zip(src) {
        *d |= *s;
    }
}

/// Whether `bits` has every bit of `pattern` set.
#[inline]
pub(crate) fn covers_bytes(bits: &[u8], pattern: &[u8]) -> bool {
    debug_assert_eq!(bits.len(), pattern.len(), "pattern length must match bucket");
    bits.iter().zip(pattern).all(|(b, p)| b & p == *p)
}
