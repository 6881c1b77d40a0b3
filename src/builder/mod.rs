//! Fluent builder for [`ShapeBloomFilter`].
//!
//! Every setting has a default, so the builder has no required steps. The
//! guard strategy is carried in the type: [`guard`](ShapeBloomFilterBuilder::guard)
//! switches it and `build()` returns a filter of the matching type.
//!
//! # Examples
//!
//! ```
//! use shapebloom::builder::ShapeBloomFilterBuilder;
//! use shapebloom::encode::ByteOrder;
//! use shapebloom::sync::SeqLockBitfield;
//!
//! let filter = ShapeBloomFilterBuilder::new()
//!     .byte_order(ByteOrder::Big)
//!     .shard_count(12)          // rounded up to 16
//!     .pool_capacity(8)
//!     .guard::<SeqLockBitfield>()
//!     .build()?;
//!
//! assert_eq!(filter.config().shard_count, 16);
//! filter.insert(&1u32)?;
//! # Ok::<(), shapebloom::ShapeBloomError>(())
//! ```
//!
//! # Parameters
//!
//! | Setting         | Default  | Constraint                               |
//! |-----------------|----------|------------------------------------------|
//! | `byte_order`    | Little   | none                                     |
//! | `shard_count`   | 16       | 1..=1024, rounded up to a power of two   |
//! | `pool_capacity` | 64       | 0 disables buffer retention              |
//! | `guard`         | rwlock   | any [`BucketGuard`]                      |

use crate::core::{FilterConfig, ShapeBloomFilter, MAX_SHARD_COUNT};
use crate::encode::ByteOrder;
use crate::error::{Result, ShapeBloomError};
use crate::sync::{BucketGuard, LockedBitfield};
use std::marker::PhantomData;

/// Builder for [`ShapeBloomFilter`].
///
/// # Type Parameters
///
/// - `G`: Bucket guard strategy (defaults to [`LockedBitfield`])
#[derive(Debug)]
pub struct ShapeBloomFilterBuilder<G = LockedBitfield> {
    config: FilterConfig,
    _guard: PhantomData<G>,
}

impl ShapeBloomFilterBuilder<LockedBitfield> {
    /// Create a builder with every setting at its default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FilterConfig::default(),
            _guard: PhantomData,
        }
    }
}

impl Default for ShapeBloomFilterBuilder<LockedBitfield> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: BucketGuard> ShapeBloomFilterBuilder<G> {
    /// Byte order for multi-byte scalars.
    #[must_use]
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.config.byte_order = order;
        self
    }

    /// Number of bucket map shards. Rounded up to the next power of two by
    /// [`build`](Self::build).
    #[must_use]
    pub fn shard_count(mut self, shards: usize) -> Self {
        self.config.shard_count = shards;
        self
    }

    /// Idle scratch buffers kept for reuse.
    #[must_use]
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.config.pool_capacity = capacity;
        self
    }

    /// Switch the bucket guard strategy.
    #[must_use]
    pub fn guard<H: BucketGuard>(self) -> ShapeBloomFilterBuilder<H> {
        ShapeBloomFilterBuilder {
            config: self.config,
            _guard: PhantomData,
        }
    }

    /// Validate the settings and create the filter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if `shard_count` is zero or above
    /// [`MAX_SHARD_COUNT`].
    pub fn build(self) -> Result<ShapeBloomFilter<G>> {
        let mut config = self.config;
        if config.shard_count > MAX_SHARD_COUNT {
            return Err(ShapeBloomError::invalid_parameters(format!(
                "shard_count {} exceeds maximum {}",
                config.shard_count, MAX_SHARD_COUNT
            )));
        }
        if config.shard_count > 0 {
            config.shard_count = config.shard_count.next_power_of_two();
        }
        config.validate()?;
        Ok(ShapeBloomFilter::from_valid_config(config))
    }
}
