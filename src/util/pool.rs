//! Scratch buffer pool for encoded values.
//!
//! Every insert and query encodes its value into a byte buffer that lives
//! only for that call. The pool hands out cleared buffers and takes them
//! back when the [`PooledBuffer`] guard drops, which covers every exit path
//! of the caller, `?` included.
//!
//! # Striping
//!
//! ```text
//! BufferPool
//! ├─ stripe 0: Mutex<Vec<Vec<u8>>>   ← threads 0, n, 2n, ...
//! ├─ stripe 1: Mutex<Vec<Vec<u8>>>   ← threads 1, n + 1, ...
//! └─ ...
//! ```
//!
//! Each thread is assigned a stripe on first use and always returns a
//! buffer to the stripe it came from. Threads on different stripes never
//! touch the same lock, so the pool adds no filter-wide serialization
//! point to inserts and queries.

use super::CacheLinePadded;
use parking_lot::Mutex;
use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Buffers larger than this are dropped instead of retained.
const MAX_RETAINED_CAPACITY: usize = 4096;

/// Upper bound on stripes, whatever the CPU count.
const MAX_STRIPES: usize = 64;

static NEXT_THREAD_SLOT: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static THREAD_SLOT: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Stable per-thread number, handed out round-robin on first call.
fn thread_slot() -> usize {
    THREAD_SLOT.with(|slot| match slot.get() {
        Some(n) => n,
        None => {
            let n = NEXT_THREAD_SLOT.fetch_add(1, Ordering::Relaxed);
            slot.set(Some(n));
            n
        }
    })
}

struct Stripe {
    free: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
}

/// Pool of reusable byte buffers.
///
/// # Examples
///
/// ```
/// use shapebloom::util::BufferPool;
///
/// let pool = BufferPool::new(4);
/// {
///     let mut buf = pool.acquire();
///     buf.extend_from_slice(b"pattern");
/// }
/// assert_eq!(pool.idle(), 1);
/// assert!(pool.acquire().is_empty());
/// ```
pub struct BufferPool {
    stripes: Box<[CacheLinePadded<Stripe>]>,
    capacity: usize,
}

impl BufferPool {
    /// Create a pool retaining at most `capacity` idle buffers.
    ///
    /// Capacity is split across one stripe per CPU (fewer if `capacity` is
    /// smaller). A capacity of zero disables retention: every acquire
    /// allocates.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cpus = thread::available_parallelism().map_or(1, |n| n.get());
        Self::with_stripes(capacity, cpus)
    }

    fn with_stripes(capacity: usize, stripes: usize) -> Self {
        let count = stripes.clamp(1, MAX_STRIPES).min(capacity.max(1));
        let stripes = (0..count)
            .map(|i| {
                let share = capacity / count + usize::from(i < capacity % count);
                CacheLinePadded::new(Stripe {
                    free: Mutex::new(Vec::with_capacity(share)),
                    capacity: share,
                })
            })
            .collect();
        Self { stripes, capacity }
    }

    /// Stripe index for the calling thread.
    #[inline]
    fn home(&self) -> usize {
        thread_slot() % self.stripes.len()
    }

    /// Take a cleared buffer, allocating if none is idle.
    #[must_use]
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let stripe = self.home();
        let mut buf = self.stripes[stripe].free.lock().pop().unwrap_or_default();
        buf.clear();
        PooledBuffer {
            buf,
            pool: self,
            stripe,
        }
    }

    /// Number of idle buffers currently held, across all stripes.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.stripes.iter().map(|s| s.free.lock().len()).sum()
    }

    /// Maximum number of idle buffers retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of independently locked stripes.
    #[must_use]
    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    fn release(&self, stripe: usize, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        let stripe = &self.stripes[stripe];
        let mut free = stripe.free.lock();
        if free.len() < stripe.capacity {
            buf.clear();
            free.push(buf);
        }
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("idle", &self.idle())
            .field("capacity", &self.capacity)
            .field("stripes", &self.stripes.len())
            .finish()
    }
}

/// Buffer on loan from a [`BufferPool`], returned on drop.
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
    stripe: usize,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    #[inline]
    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(self.stripe, std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_acquire_returns_cleared_buffer() {
        let pool = BufferPool::new(2);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[1, 2, 3]);
        }
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 3);
    }

    #[test]
    fn test_returned_on_early_exit() {
        fn fails(pool: &BufferPool) -> Result<(), ()> {
            let mut buf = pool.acquire();
            buf.push(1);
            let failed: Result<(), ()> = Err(());
            failed?;
            Ok(())
        }

        let pool = BufferPool::new(2);
        assert!(fails(&pool).is_err());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_capacity_bounds_retention() {
        let pool = BufferPool::new(1);
        let a = pool.acquire();
        let b = pool.acquire();
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let pool = BufferPool::new(0);
        drop(pool.acquire());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_oversized_buffers_dropped() {
        let pool = BufferPool::new(4);
        {
            let mut buf = pool.acquire();
            buf.resize(MAX_RETAINED_CAPACITY + 1, 0);
        }
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_capacity_split_across_stripes() {
        let pool = BufferPool::with_stripes(10, 4);
        assert_eq!(pool.stripe_count(), 4);
        assert_eq!(pool.capacity(), 10);
        let shares: Vec<_> = pool.stripes.iter().map(|s| s.capacity).collect();
        assert_eq!(shares, vec![3, 3, 2, 2]);

        // Never more stripes than retained buffers, and at least one.
        assert_eq!(BufferPool::with_stripes(2, 8).stripe_count(), 2);
        assert_eq!(BufferPool::with_stripes(0, 8).stripe_count(), 1);
        assert_eq!(BufferPool::with_stripes(1024, 1024).stripe_count(), MAX_STRIPES);
    }

    #[test]
    fn test_thread_keeps_its_stripe() {
        let pool = BufferPool::with_stripes(8, 4);
        let home = pool.home();
        for _ in 0..10 {
            assert_eq!(pool.acquire().stripe, home);
        }
        assert_eq!(pool.stripes[home].free.lock().len(), 1);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_threads_get_distinct_slots() {
        let mine = thread_slot();
        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let slot = thread_slot();
                    barrier.wait();
                    assert_eq!(thread_slot(), slot);
                    slot
                })
            })
            .collect();

        let mut slots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        slots.push(mine);
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), 5);
        assert_eq!(thread_slot(), mine);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(BufferPool::new(8));
        let handles: Vec<_> = (0..8)
            .map(|tid| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for i in 0..500u32 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        buf.extend_from_slice(&(tid * 1000 + i).to_le_bytes());
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(pool.idle() <= 8);
    }
}
