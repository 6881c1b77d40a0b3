//! Filter configuration.
//!
//! None of these settings affect membership answers except
//! [`byte_order`](FilterConfig::byte_order), which decides the bit layout of
//! every multi-byte scalar. The rest trade memory for contention.

use crate::encode::ByteOrder;
use crate::error::{Result, ShapeBloomError};

/// Default number of bucket map shards.
///
/// Most workloads have a handful of distinct encoded lengths; 16 shards keep
/// first-use bucket creation for different lengths on different locks.
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Upper bound on bucket map shards.
pub const MAX_SHARD_COUNT: usize = 1024;

/// Default number of idle scratch buffers retained.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Construction-time settings for a [`ShapeBloomFilter`](crate::ShapeBloomFilter).
///
/// # Examples
///
/// ```
/// use shapebloom::core::FilterConfig;
/// use shapebloom::encode::ByteOrder;
/// use shapebloom::ShapeBloomFilter;
///
/// let config = FilterConfig {
///     byte_order: ByteOrder::Big,
///     ..FilterConfig::default()
/// };
/// let filter = ShapeBloomFilter::with_config(config)?;
/// assert_eq!(filter.byte_order(), ByteOrder::Big);
/// # Ok::<(), shapebloom::ShapeBloomError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Byte order for multi-byte scalars.
    pub byte_order: ByteOrder,

    /// Number of independently locked shards in the bucket map, in
    /// `1..=MAX_SHARD_COUNT`.
    pub shard_count: usize,

    /// Maximum idle scratch buffers kept for reuse. Zero disables pooling.
    pub pool_capacity: usize,
}

impl FilterConfig {
    /// Check every field is in range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if `shard_count` is zero or above
    /// [`MAX_SHARD_COUNT`].
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(ShapeBloomError::invalid_parameters(
                "shard_count must be greater than 0",
            ));
        }
        if self.shard_count > MAX_SHARD_COUNT {
            return Err(ShapeBloomError::invalid_parameters(format!(
                "shard_count {} exceeds maximum {}",
                self.shard_count, MAX_SHARD_COUNT
            )));
        }
        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Little,
            shard_count: DEFAULT_SHARD_COUNT,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}
