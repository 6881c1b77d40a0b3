//! The length-bucketed membership filter.
//!
//! # Insert and Query Protocol
//!
//! ```text
//! insert(v):
//!   bytes = encode(v)                  ← error here mutates nothing
//!   bucket = store.get_or_create(len)  ← zero-filled on first use
//!   bucket.merge(bytes)                ← bits[i] |= bytes[i], one exclusive write
//!   inserted += 1
//!
//! possibly_contains(v):
//!   bytes = encode(v)
//!   bucket = store.get(len)            ← never creates
//!   none            → false
//!   some(bucket)    → ∀i: bytes[i] & bits[i] == bytes[i]
//! ```
//!
//! The encoded value itself is the bit pattern. There are no hash functions:
//! two values with the same encoded length share one bitfield, and a query
//! answers "possibly present" when the union of everything inserted at that
//! length covers its bytes. That union can cover a value never inserted
//! (a false positive). It can never miss a value that was inserted.

use super::bucket::BucketStats;
use super::config::FilterConfig;
use super::store::BucketStore;
use crate::encode::{ByteOrder, Encoder, FixedEncode};
use crate::error::{Result, ShapeBloomError};
use crate::sync::{BucketGuard, LockedBitfield, SeqLockBitfield};
use crate::util::{AtomicCounter, BufferPool};
use std::fmt;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Concurrent approximate-membership filter keyed by encoded value shape.
///
/// All operations take `&self`; share the filter across threads with
/// [`Arc`](std::sync::Arc). The guard type `G` selects how each bucket is
/// synchronized: [`LockedBitfield`] (the default, one `RwLock` per bucket)
/// or [`SeqLockBitfield`] (lock-free optimistic).
///
/// # Examples
///
/// ```
/// use shapebloom::ShapeBloomFilter;
///
/// let filter = ShapeBloomFilter::new();
/// filter.insert(&3i64)?;
///
/// assert!(filter.possibly_contains(&3i64)?);
/// assert!(!filter.possibly_contains(&3i32)?); // 4-byte bucket never created
/// assert_eq!(filter.len(), 1);
/// # Ok::<(), shapebloom::ShapeBloomError>(())
/// ```
///
/// Sharing between threads:
///
/// ```
/// use shapebloom::ShapeBloomFilter;
/// use std::sync::Arc;
/// use std::thread;
///
/// let filter = Arc::new(ShapeBloomFilter::optimistic());
/// let handles: Vec<_> = (0..4u32)
///     .map(|t| {
///         let filter = Arc::clone(&filter);
///         thread::spawn(move || {
///             for i in 0..100u32 {
///                 filter.insert(&(t * 100 + i)).unwrap();
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert_eq!(filter.len(), 400);
/// ```
pub struct ShapeBloomFilter<G: BucketGuard = LockedBitfield> {
    store: BucketStore<G>,
    inserted: AtomicCounter,
    pool: BufferPool,
    config: FilterConfig,
}

impl ShapeBloomFilter<LockedBitfield> {
    /// Create an empty filter with the default configuration and one
    /// read-write lock per bucket.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(FilterConfig::default())
    }

    /// Create an empty lock-based filter from `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if `config` fails
    /// [`FilterConfig::validate`].
    pub fn with_config(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }
}

impl ShapeBloomFilter<SeqLockBitfield> {
    /// Create an empty filter with the default configuration and lock-free
    /// optimistic buckets.
    #[must_use]
    pub fn optimistic() -> Self {
        Self::from_valid_config(FilterConfig::default())
    }
}

impl<G: BucketGuard> ShapeBloomFilter<G> {
    /// Caller has already validated `config`.
    pub(crate) fn from_valid_config(config: FilterConfig) -> Self {
        Self {
            store: BucketStore::new(config.shard_count),
            inserted: AtomicCounter::new(0),
            pool: BufferPool::new(config.pool_capacity),
            config,
        }
    }

    /// Encode `value` into `buf` with this filter's byte order.
    fn encode_into<V: FixedEncode + ?Sized>(&self, value: &V, buf: &mut Vec<u8>) -> Result<()> {
        let mut out = Encoder::new(buf, self.config.byte_order);
        value.encode(&mut out).map_err(|err| {
            tracing::trace!(error = %err, "value rejected by encoder");
            err
        })
    }

    /// Record `value` as present.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if `value` has no fixed-width encoding. The filter
    /// is left untouched: no bucket is created and [`len`](Self::len) does
    /// not move.
    ///
    /// # Examples
    ///
    /// ```
    /// use shapebloom::ShapeBloomFilter;
    ///
    /// let filter = ShapeBloomFilter::new();
    /// filter.insert(&(10i32, 300u64))?;
    /// assert!(filter.insert(&String::from("variable width")).is_err());
    /// assert_eq!(filter.len(), 1);
    /// # Ok::<(), shapebloom::ShapeBloomError>(())
    /// ```
    pub fn insert<V: FixedEncode + ?Sized>(&self, value: &V) -> Result<()> {
        let mut scratch = self.pool.acquire();
        self.encode_into(value, &mut scratch)?;

        let bucket = self.store.get_or_create(scratch.len());
        bucket.merge(&scratch);
        self.inserted.increment();
        Ok(())
    }

    /// Whether `value` may have been inserted.
    ///
    /// `false` is definite. `true` may be a false positive. Never creates a
    /// bucket.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if `value` has no fixed-width encoding.
    pub fn possibly_contains<V: FixedEncode + ?Sized>(&self, value: &V) -> Result<bool> {
        let mut scratch = self.pool.acquire();
        self.encode_into(value, &mut scratch)?;

        Ok(match self.store.get(scratch.len()) {
            Some(bucket) => bucket.covers(&scratch),
            None => false,
        })
    }

    /// Insert every value in `values`, in order.
    ///
    /// Stops at the first value that fails to encode and returns its error;
    /// values before it stay inserted. On success returns how many were
    /// inserted.
    ///
    /// # Errors
    ///
    /// Returns the first `Encoding` error.
    pub fn insert_batch<'a, V, I>(&self, values: I) -> Result<usize>
    where
        V: FixedEncode + ?Sized + 'a,
        I: IntoIterator<Item = &'a V>,
    {
        let mut count = 0;
        for value in values {
            self.insert(value)?;
            count += 1;
        }
        Ok(count)
    }

    /// Query every value in `values`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first `Encoding` error.
    pub fn contains_batch<'a, V, I>(&self, values: I) -> Result<Vec<bool>>
    where
        V: FixedEncode + ?Sized + 'a,
        I: IntoIterator<Item = &'a V>,
    {
        values
            .into_iter()
            .map(|value| self.possibly_contains(value))
            .collect()
    }

    /// Insert `values` across the rayon thread pool (requires `rayon` feature).
    ///
    /// Unlike [`insert_batch`](Self::insert_batch) there is no ordering:
    /// if any value fails to encode, an arbitrary subset of the others may
    /// already be inserted.
    ///
    /// # Errors
    ///
    /// Returns an `Encoding` error if any value fails to encode.
    #[cfg(feature = "rayon")]
    pub fn par_insert_batch<V>(&self, values: &[V]) -> Result<usize>
    where
        V: FixedEncode + Sync,
    {
        values.par_iter().try_for_each(|value| self.insert(value))?;
        Ok(values.len())
    }

    /// Number of successful inserts, including repeats.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inserted.get()
    }

    /// Whether nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte order used to encode multi-byte scalars.
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.config.byte_order
    }

    /// Configuration the filter was built with.
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Number of distinct encoded lengths seen by `insert`.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.store.len()
    }

    /// Encoded lengths that have a bucket, ascending.
    #[must_use]
    pub fn bucket_lengths(&self) -> Vec<usize> {
        self.store
            .buckets()
            .iter()
            .map(|bucket| bucket.length())
            .collect()
    }

    /// Copy of the accumulated bitfield for `length`, if any value of that
    /// length was inserted.
    #[must_use]
    pub fn bitfield(&self, length: usize) -> Option<Vec<u8>> {
        self.store.read(length)
    }

    /// Statistics for every bucket, ascending by length.
    #[must_use]
    pub fn bucket_stats(&self) -> Vec<BucketStats> {
        self.store
            .buckets()
            .iter()
            .map(|bucket| bucket.stats())
            .collect()
    }

    /// Approximate heap usage in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.store.memory_usage()
    }

    /// OR every bucket of `other` into this filter.
    ///
    /// Afterwards this filter answers "possibly present" for everything
    /// either filter did, and [`len`](Self::len) grows by `other.len()`.
    /// The guard strategies may differ.
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleFilters` if the byte orders differ, since the
    /// same value would then set different bits in each.
    ///
    /// # Examples
    ///
    /// ```
    /// use shapebloom::ShapeBloomFilter;
    ///
    /// let a = ShapeBloomFilter::new();
    /// let b = ShapeBloomFilter::optimistic();
    /// a.insert(&1u32)?;
    /// b.insert(&2u64)?;
    ///
    /// a.union(&b)?;
    /// assert!(a.possibly_contains(&2u64)?);
    /// assert_eq!(a.len(), 2);
    /// # Ok::<(), shapebloom::ShapeBloomError>(())
    /// ```
    pub fn union<H: BucketGuard>(&self, other: &ShapeBloomFilter<H>) -> Result<()> {
        if self.byte_order() != other.byte_order() {
            return Err(ShapeBloomError::incompatible_filters(format!(
                "byte order mismatch: {:?} vs {:?}",
                self.byte_order(),
                other.byte_order()
            )));
        }

        let buckets = other.store.buckets();
        for bucket in &buckets {
            self.store
                .get_or_create(bucket.length())
                .absorb(&bucket.snapshot(), bucket.inserts());
        }
        let added = other.len();
        self.inserted.add(added);

        tracing::debug!(buckets = buckets.len(), inserts = added, "merged filter");
        Ok(())
    }

    /// Rebuild a filter from a snapshot's parts. Buckets are `(length,
    /// inserts, bits)` with `bits.len() == length` already checked.
    #[cfg(feature = "serde")]
    pub(crate) fn restore(
        config: FilterConfig,
        inserted: u64,
        buckets: impl IntoIterator<Item = (usize, u64, Vec<u8>)>,
    ) -> Self {
        let filter = Self::from_valid_config(config);
        let mut restored = 0usize;
        for (length, inserts, bits) in buckets {
            filter.store.get_or_create(length).absorb(&bits, inserts);
            restored += 1;
        }
        filter.inserted.add(inserted);
        tracing::debug!(buckets = restored, inserted, "restored filter");
        filter
    }

    /// `(length, inserts, bits)` for every bucket, ascending by length.
    #[cfg(feature = "serde")]
    pub(crate) fn bucket_snapshots(&self) -> Vec<(usize, u64, Vec<u8>)> {
        self.store
            .buckets()
            .iter()
            .map(|bucket| (bucket.length(), bucket.inserts(), bucket.snapshot()))
            .collect()
    }
}

impl<G: BucketGuard> Default for ShapeBloomFilter<G> {
    fn default() -> Self {
        Self::from_valid_config(FilterConfig::default())
    }
}

impl<G: BucketGuard> fmt::Debug for ShapeBloomFilter<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeBloomFilter")
            .field("strategy", &G::STRATEGY)
            .field("byte_order", &self.config.byte_order)
            .field("inserted", &self.len())
            .field("buckets", &self.bucket_lengths())
            .finish()
    }
}

impl<G: BucketGuard> fmt::Display for ShapeBloomFilter<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShapeBloomFilter {{ strategy: {}, inserted: {}, buckets: {} }}",
            G::STRATEGY,
            self.len(),
            self.bucket_count()
        )
    }
}
