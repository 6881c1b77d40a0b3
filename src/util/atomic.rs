//! Atomic counters and cache-line padding.
//!
//! Counters here are touched by every insert on every thread, so each one is
//! padded to its own cache line to keep unrelated cores from invalidating
//! each other's lines.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache line size assumed for padding (x86-64, most ARM64 parts).
pub const CACHE_LINE_SIZE: usize = 64;

/// Value aligned to a full cache line.
///
/// # Examples
///
/// ```
/// use shapebloom::util::CacheLinePadded;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let padded = CacheLinePadded::new(AtomicU64::new(1));
/// padded.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(padded.load(Ordering::Relaxed), 2);
/// assert_eq!(std::mem::align_of_val(&padded), 64);
/// ```
#[repr(align(64))]
#[derive(Default)]
pub struct CacheLinePadded<T> {
    value: T,
}

impl<T> CacheLinePadded<T> {
    /// Wrap `value`.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Consume the padding and return the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> std::ops::Deref for CacheLinePadded<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> std::ops::DerefMut for CacheLinePadded<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheLinePadded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheLinePadded")
            .field("value", &self.value)
            .finish()
    }
}

/// Monotonic event counter with cache line padding.
///
/// Used for the filter-wide insertion count and the per-bucket counts.
/// Increments are `Relaxed`. The count is not ordered against bitfield
/// writes; the bucket guards order those.
///
/// # Examples
///
/// ```
/// use shapebloom::util::AtomicCounter;
///
/// let counter = AtomicCounter::new(0);
/// counter.increment();
/// counter.add(5);
/// assert_eq!(counter.get(), 6);
/// ```
#[repr(align(64))]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    /// Create a counter starting at `initial`.
    #[must_use]
    pub const fn new(initial: u64) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }

    /// Current value.
    #[inline]
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Increment by 1 and return the previous value.
    #[inline]
    pub fn fetch_increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::Relaxed)
    }

    /// Increment by 1.
    #[inline]
    pub fn increment(&self) {
        self.fetch_increment();
    }

    /// Add `delta`.
    #[inline]
    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for AtomicCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicCounter").field(&self.get()).finish()
    }
}
