//! Read-write locked bitfield.
//!
//! One `parking_lot::RwLock` per bucket. `parking_lot` is writer-fair, so a
//! steady stream of queries cannot starve inserts into the same bucket, and
//! it carries no poisoning: a panic elsewhere never makes a bucket
//! unreadable.

use super::{covers_bytes, or_into, BucketGuard};
use parking_lot::RwLock;
use std::fmt;

#[cfg(feature = "metrics")]
use crate::util::AtomicCounter;

/// Bitfield guarded by a read-write lock.
///
/// # Locking Protocol
///
/// | Operation    | Lock Type | Duration                |
/// |--------------|-----------|-------------------------|
/// | `merge()`    | Write     | One OR pass             |
/// | `covers()`   | Read      | One AND pass, may exit early |
/// | `snapshot()` | Read      | One copy                |
///
/// # Examples
///
/// ```
/// use shapebloom::sync::{BucketGuard, LockedBitfield};
///
/// let bits = LockedBitfield::zeroed(4);
/// bits.merge(&3u32.to_le_bytes());
/// assert!(bits.covers(&1u32.to_le_bytes()));
/// assert!(!bits.covers(&4u32.to_le_bytes()));
/// ```
pub struct LockedBitfield {
    bits: RwLock<Box<[u8]>>,
    len: usize,

    /// Lock acquisitions that found the lock held (requires `metrics` feature).
    #[cfg(feature = "metrics")]
    contended: AtomicCounter,
}

impl BucketGuard for LockedBitfield {
    const STRATEGY: &'static str = "rwlock";

    fn zeroed(len: usize) -> Self {
        Self {
            bits: RwLock::new(vec![0u8; len].into_boxed_slice()),
            len,
            #[cfg(feature = "metrics")]
            contended: AtomicCounter::new(0),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn merge(&self, pattern: &[u8]) {
        #[cfg(feature = "metrics")]
        let mut bits = match self.bits.try_write() {
            Some(guard) => guard,
            None => {
                self.contended.increment();
                self.bits.write()
            }
        };

        #[cfg(not(feature = "metrics"))]
        let mut bits = self.bits.write();

        or_into(&mut bits, pattern);
    }

    fn covers(&self, pattern: &[u8]) -> bool {
        #[cfg(feature = "metrics")]
        let bits = match self.bits.try_read() {
            Some(guard) => guard,
            None => {
                self.contended.increment();
                self.bits.read()
            }
        };

        #[cfg(not(feature = "metrics"))]
        let bits = self.bits.read();

        covers_bytes(&bits, pattern)
    }

    fn snapshot(&self) -> Vec<u8> {
        self.bits.read().to_vec()
    }

    fn count_ones(&self) -> usize {
        self.bits
            .read()
            .iter()
            .map(|byte| byte.count_ones() as usize)
            .sum()
    }

    #[cfg(feature = "metrics")]
    fn contention(&self) -> u64 {
        self.contended.get()
    }
}

#[cfg(all(test, feature = "metrics"))]
impl LockedBitfield {
    /// Hold the write lock, so the next merge or query has to wait.
    pub(crate) fn lock_exclusive(&self) -> parking_lot::RwLockWriteGuard<'_, Box<[u8]>> {
        self.bits.write()
    }
}

impl fmt::Debug for LockedBitfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedBitfield")
            .field("len", &self.len)
            .field("ones", &self.count_ones())
            .finish()
    }
}
