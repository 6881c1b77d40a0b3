//! Lock-free optimistic bitfield.
//!
//! # Design
//!
//! ```text
//! SeqLockBitfield
//! ├─ version: AtomicU64        ← even = stable, odd = write in progress
//! └─ bits: Box<[AtomicU8]>     ← written only by the holder of an odd version
//! ```
//!
//! A writer loads an even version `v`, checks optimistically whether its
//! pattern is already covered (nothing to commit if so), then commits by
//! compare-and-swap `v → v + 1`. A failed swap means another writer got
//! there first, and the writer retries from a fresh version. The winner ORs
//! its pattern in and publishes `v + 2`.
//!
//! A reader loads an even version, reads the bytes, and re-checks the
//! version. If it changed, the read may have mixed two states and is
//! retried.
//!
//! No thread ever blocks in the OS. Contended threads spin with
//! exponential backoff and fall back to `yield_now`.

use super::BucketGuard;
use std::fmt;
use std::hint;
use std::sync::atomic::{fence, AtomicU64, AtomicU8, Ordering};
use std::thread;

#[cfg(feature = "metrics")]
use crate::util::AtomicCounter;

/// Spin iterations (as a power of two) before yielding the thread.
const SPIN_LIMIT: u32 = 6;

/// Exponential backoff for retry loops.
struct Backoff {
    step: u32,
}

impl Backoff {
    #[inline]
    fn new() -> Self {
        Self { step: 0 }
    }

    #[inline]
    fn snooze(&mut self) {
        if self.step <= SPIN_LIMIT {
            for _ in 0..1u32 << self.step {
                hint::spin_loop();
            }
            self.step += 1;
        } else {
            thread::yield_now();
        }
    }
}

/// Bitfield guarded by a sequence counter with compare-and-swap commits.
///
/// # Examples
///
/// ```
/// use shapebloom::sync::{BucketGuard, SeqLockBitfield};
/// use std::sync::Arc;
/// use std::thread;
///
/// let bits = Arc::new(SeqLockBitfield::zeroed(1));
/// let handles: Vec<_> = (0..8u8)
///     .map(|bit| {
///         let bits = Arc::clone(&bits);
///         thread::spawn(move || bits.merge(&[1 << bit]))
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert_eq!(bits.snapshot(), vec![0xFF]);
/// ```
pub struct SeqLockBitfield {
    version: AtomicU64,
    bits: Box<[AtomicU8]>,

    /// Waits on an in-flight writer, failed commits and invalidated reads
    /// (requires `metrics` feature).
    #[cfg(feature = "metrics")]
    retries: AtomicCounter,
}

impl SeqLockBitfield {
    /// Current version. Even when no write is in progress.
    ///
    /// Advances by 2 per committed write; merges of already-covered
    /// patterns commit nothing and leave it unchanged.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Load a stable (even) version, waiting out any in-flight writer.
    ///
    /// A wait counts once toward `contention`, however long it spins.
    #[inline]
    fn stable_version(&self) -> u64 {
        let v = self.version.load(Ordering::Acquire);
        if v & 1 == 0 {
            return v;
        }

        #[cfg(feature = "metrics")]
        self.retries.increment();

        let mut backoff = Backoff::new();
        loop {
            backoff.snooze();
            let v = self.version.load(Ordering::Acquire);
            if v & 1 == 0 {
                return v;
            }
        }
    }

    /// Whether no write committed since `v` was loaded.
    ///
    /// The acquire fence orders the preceding relaxed byte loads before the
    /// version re-check.
    #[inline]
    fn validate(&self, v: u64) -> bool {
        fence(Ordering::Acquire);
        self.version.load(Ordering::Relaxed) == v
    }

    /// Run `read` under a validated version, retrying until it is consistent.
    #[inline]
    fn optimistic_read<R>(&self, read: impl Fn(&[AtomicU8]) -> R) -> R {
        let mut backoff = Backoff::new();
        loop {
            let v = self.stable_version();
            let out = read(&self.bits[..]);
            if self.validate(v) {
                return out;
            }
            #[cfg(feature = "metrics")]
            self.retries.increment();
            backoff.snooze();
        }
    }
}

#[inline]
fn covers_atomic(bits: &[AtomicU8], pattern: &[u8]) -> bool {
    debug_assert_eq!(bits.len(), pattern.len(), "pattern length must match bucket");
    bits.iter()
        .zip(pattern)
        .all(|(cell, p)| cell.load(Ordering::Relaxed) & p == *p)
}

impl BucketGuard for SeqLockBitfield {
    const STRATEGY: &'static str = "seqlock";

    fn zeroed(len: usize) -> Self {
        Self {
            version: AtomicU64::new(0),
            bits: (0..len).map(|_| AtomicU8::new(0)).collect(),
            #[cfg(feature = "metrics")]
            retries: AtomicCounter::new(0),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.bits.len()
    }

    fn merge(&self, pattern: &[u8]) {
        let mut backoff = Backoff::new();
        loop {
            let v = self.stable_version();

            // Already covered under a stable version: no bits to add.
            if covers_atomic(&self.bits, pattern) && self.validate(v) {
                return;
            }

            if self
                .version
                .compare_exchange_weak(v, v + 1, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                // Readers that see any byte below must also see the odd version.
                fence(Ordering::Release);
                for (cell, p) in self.bits.iter().zip(pattern) {
                    if *p != 0 {
                        let current = cell.load(Ordering::Relaxed);
                        cell.store(current | p, Ordering::Relaxed);
                    }
                }
                self.version.store(v + 2, Ordering::Release);
                return;
            }

            #[cfg(feature = "metrics")]
            self.retries.increment();
            backoff.snooze();
        }
    }

    fn covers(&self, pattern: &[u8]) -> bool {
        self.optimistic_read(|bits| covers_atomic(bits, pattern))
    }

    fn snapshot(&self) -> Vec<u8> {
        self.optimistic_read(|bits| {
            bits.iter()
                .map(|cell| cell.load(Ordering::Relaxed))
                .collect()
        })
    }

    #[cfg(feature = "metrics")]
    fn contention(&self) -> u64 {
        self.retries.get()
    }
}

impl fmt::Debug for SeqLockBitfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqLockBitfield")
            .field("len", &self.bits.len())
            .field("version", &self.version())
            .field("ones", &self.count_ones())
            .finish()
    }
}
