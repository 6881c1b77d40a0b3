//! Sharded map from encoded length to bucket.
//!
//! # Sharding Strategy
//!
//! The length is mixed with a Fibonacci multiplier and mapped onto a shard
//! with Lemire's fast range reduction:
//!
//! ```text
//! shard_idx = floor((mix(length) × num_shards) / 2^64)
//! ```
//!
//! Raw lengths cluster on small powers of two (4, 8, 16), so the mixing step
//! keeps them from piling onto the same shard.
//!
//! # Locking Protocol
//!
//! | Operation          | Shard Lock | Duration                          |
//! |--------------------|------------|-----------------------------------|
//! | `get()`            | Read       | Map lookup + `Arc` clone          |
//! | `get_or_create()`  | Read, then Write on miss | Lookup, insert once |
//! | `buckets()`        | Read (each)| Collect `Arc`s                    |
//!
//! Shard locks are never held while a bucket's own guard is taken: callers
//! get an `Arc<Bucket>` and release the shard first.

use super::bucket::Bucket;
use crate::sync::BucketGuard;
use crate::util::CacheLinePadded;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 2^64 / φ, the usual Fibonacci hashing multiplier.
const FIB_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

type Shard<G> = CacheLinePadded<RwLock<HashMap<usize, Arc<Bucket<G>>>>>;

/// Concurrent length → bucket map with lazy, idempotent creation.
///
/// # Examples
///
/// ```
/// use shapebloom::core::BucketStore;
/// use shapebloom::sync::LockedBitfield;
/// use std::sync::Arc;
///
/// let store = BucketStore::<LockedBitfield>::new(16);
/// assert!(store.get(8).is_none());
///
/// let a = store.get_or_create(8);
/// let b = store.get_or_create(8);
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(store.read(8), Some(vec![0; 8]));
/// ```
pub struct BucketStore<G> {
    shards: Box<[Shard<G>]>,
}

impl<G: BucketGuard> BucketStore<G> {
    /// Create an empty store with `shard_count` shards.
    ///
    /// # Panics
    ///
    /// Panics if `shard_count == 0`. [`FilterConfig::validate`] rejects that
    /// before a filter gets here.
    ///
    /// [`FilterConfig::validate`]: super::FilterConfig::validate
    #[must_use]
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "BucketStore needs at least one shard");
        let shards = (0..shard_count)
            .map(|_| CacheLinePadded::new(RwLock::new(HashMap::new())))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { shards }
    }

    /// Number of shards.
    #[inline]
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    fn shard_index(&self, length: usize) -> usize {
        let mixed = (length as u64).wrapping_mul(FIB_MULTIPLIER);
        let idx = ((mixed as u128 * self.shards.len() as u128) >> 64) as usize;
        debug_assert!(idx < self.shards.len());
        idx
    }

    /// Bucket for `length`, if one was ever created.
    #[must_use]
    pub fn get(&self, length: usize) -> Option<Arc<Bucket<G>>> {
        self.shards[self.shard_index(length)]
            .read()
            .get(&length)
            .map(Arc::clone)
    }

    /// Bucket for `length`, creating a zero-filled one on first use.
    ///
    /// Concurrent first calls for the same length all receive the same
    /// bucket: the first to take the shard's write lock creates it, the rest
    /// find it in the entry.
    pub fn get_or_create(&self, length: usize) -> Arc<Bucket<G>> {
        let idx = self.shard_index(length);
        let shard = &self.shards[idx];

        if let Some(bucket) = shard.read().get(&length) {
            return Arc::clone(bucket);
        }

        match shard.write().entry(length) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                tracing::debug!(
                    length,
                    shard = idx,
                    strategy = G::STRATEGY,
                    "created bucket"
                );
                Arc::clone(entry.insert(Arc::new(Bucket::new(length))))
            }
        }
    }

    /// Read-only copy of the bitfield for `length`, if present.
    #[must_use]
    pub fn read(&self, length: usize) -> Option<Vec<u8>> {
        self.get(length).map(|bucket| bucket.snapshot())
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    /// Whether no bucket exists yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }

    /// All buckets, sorted by length.
    #[must_use]
    pub fn buckets(&self) -> Vec<Arc<Bucket<G>>> {
        let mut all: Vec<_> = self
            .shards
            .iter()
            .flat_map(|shard| shard.read().values().map(Arc::clone).collect::<Vec<_>>())
            .collect();
        all.sort_unstable_by_key(|bucket| bucket.length());
        all
    }

    /// Approximate heap usage in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        let bucket_bytes: usize = self
            .buckets()
            .iter()
            .map(|bucket| bucket.length() + std::mem::size_of::<Bucket<G>>())
            .sum();
        bucket_bytes + self.shards.len() * std::mem::size_of::<Shard<G>>()
    }
}

impl<G: BucketGuard> fmt::Debug for BucketStore<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketStore")
            .field("shards", &self.shards.len())
            .field("buckets", &self.len())
            .finish()
    }
}
