//! shapebloom: concurrent approximate-membership filter keyed by value shape.
//!
//! A filter answers "might this value have been inserted before?" with no
//! false negatives and some false positives, without storing the values.
//! Use it as a cheap pre-check in front of an expensive lookup.
//!
//! # How It Works
//!
//! This is not a k-hash Bloom filter. Each value is encoded to fixed-width
//! bytes by [`FixedEncode`], and those bytes are the bit pattern. Patterns
//! are grouped by encoded length; each group ORs its patterns into one
//! bitfield.
//!
//! ```text
//! insert(10i32, 300u64)      → 12 bytes  → bucket[12] |= bytes
//! insert(3i64)               →  8 bytes  → bucket[8]  |= bytes
//! possibly_contains(3i32)    →  4 bytes  → no bucket[4]      → false
//! possibly_contains(3i64)    →  8 bytes  → bytes ⊆ bucket[8] → true
//! ```
//!
//! A query is positive when every set bit of its pattern is set in the
//! bucket. Two inserted values can together cover a third that was never
//! inserted; that is the source of false positives.
//!
//! # Quick Start
//!
//! ```
//! use shapebloom::{fixed_encode, ShapeBloomFilter};
//!
//! struct Record {
//!     a: i32,
//!     b: u64,
//! }
//! fixed_encode!(Record { a, b });
//!
//! let filter = ShapeBloomFilter::new();
//! filter.insert(&Record { a: 10, b: 300 })?;
//!
//! assert!(filter.possibly_contains(&Record { a: 10, b: 300 })?);
//! assert!(!filter.possibly_contains(&7u16)?);
//! assert_eq!(filter.len(), 1);
//! # Ok::<(), shapebloom::ShapeBloomError>(())
//! ```
//!
//! # Concurrency
//!
//! Every operation takes `&self`. Share the filter with `Arc`; no outer lock
//! is needed. Buckets of different lengths never contend. Within a bucket
//! the guard strategy decides how writers and readers coordinate:
//!
//! | Strategy              | Constructor                        | Writers          | Readers            |
//! |-----------------------|------------------------------------|------------------|--------------------|
//! | [`LockedBitfield`]    | [`ShapeBloomFilter::new`]          | `RwLock` write   | `RwLock` read      |
//! | [`SeqLockBitfield`]   | [`ShapeBloomFilter::optimistic`]   | CAS on version   | validate and retry |
//!
//! # Encoding
//!
//! Built-in encodings cover the fixed-width scalars, `bool`, `char`, `()`,
//! arrays, slices, `Vec`, tuples up to arity 8, and references. `usize`,
//! `isize`, `str` and `String` are rejected with
//! [`ShapeBloomError::Encoding`]: their width is not fixed. Use
//! [`fixed_encode!`] for structs.
//!
//! # Feature Flags
//!
//! - `serde` - Snapshot serialization of filters
//! - `metrics` - Per-bucket query, positive and contention counters
//! - `rayon` - [`ShapeBloomFilter::par_insert_batch`]
//! - `proptest` - Property tests
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (`debug` on bucket creation, union and
//! restore, `trace` on encoding rejection). No subscriber is installed.
//!
//! [`LockedBitfield`]: sync::LockedBitfield
//! [`SeqLockBitfield`]: sync::SeqLockBitfield

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::len_without_is_empty)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Core filter types.
pub mod core;

/// Error types.
pub mod error;

/// Fixed-width value encoding.
pub mod encode;

/// Per-bucket concurrency guards.
pub mod sync;

/// Fluent filter builder.
pub mod builder;

/// Internal utilities.
pub mod util;

/// Serialization support.
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod serde_support;

pub use builder::ShapeBloomFilterBuilder;
pub use crate::core::{BucketStats, FilterConfig, ShapeBloomFilter};
pub use encode::{encode_to_vec, ByteOrder, Encoder, FixedEncode};
pub use error::{Result, ShapeBloomError};
pub use sync::{BucketGuard, LockedBitfield, SeqLockBitfield};

#[cfg(feature = "serde")]
pub use serde_support::FilterSerdeSupport;

/// Common imports.
///
/// ```
/// use shapebloom::prelude::*;
///
/// let filter = ShapeBloomFilterBuilder::new()
///     .guard::<SeqLockBitfield>()
///     .build()?;
/// filter.insert(&1u8)?;
/// # Ok::<(), ShapeBloomError>(())
/// ```
pub mod prelude {
    pub use crate::builder::ShapeBloomFilterBuilder;
    pub use crate::core::{BucketStats, FilterConfig, ShapeBloomFilter};
    pub use crate::encode::{ByteOrder, Encoder, FixedEncode};
    pub use crate::error::{Result, ShapeBloomError};
    pub use crate::fixed_encode;
    pub use crate::sync::{BucketGuard, LockedBitfield, SeqLockBitfield};
}
