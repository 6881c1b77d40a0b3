//! Serialization support for [`ShapeBloomFilter`] (requires `serde` feature).
//!
//! # Format
//!
//! A filter serializes as a versioned snapshot:
//!
//! ```text
//! FilterSnapshot
//! ├─ version: u16
//! ├─ byte_order: Little | Big
//! ├─ inserted: u64
//! └─ buckets: [ { length, inserts, bits: [u8; length] }, ... ]   ← ascending length
//! ```
//!
//! Shard count and pool capacity are tuning knobs, not state, and restore to
//! their defaults. The guard strategy is not recorded either: a snapshot
//! taken from a lock-based filter restores into an optimistic one and back.
//!
//! Each bucket is copied under its own guard. A snapshot taken while other
//! threads insert is consistent per bucket but not across buckets.
//!
//! # Validation
//!
//! Restore rejects an unknown `version`, a bucket whose `bits` length differs
//! from its `length`, and repeated bucket lengths.
//!
//! # Examples
//!
//! ```
//! use shapebloom::ShapeBloomFilter;
//!
//! let filter = ShapeBloomFilter::new();
//! filter.insert(&(10i32, 300u64))?;
//!
//! let json = serde_json::to_string(&filter).unwrap();
//! let restored: ShapeBloomFilter = serde_json::from_str(&json).unwrap();
//! assert!(restored.possibly_contains(&(10i32, 300u64))?);
//! assert_eq!(restored.len(), 1);
//! # Ok::<(), shapebloom::ShapeBloomError>(())
//! ```

use crate::core::{FilterConfig, ShapeBloomFilter};
use crate::encode::ByteOrder;
use crate::error::{Result, ShapeBloomError};
use crate::sync::BucketGuard;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// Snapshot format version for compatibility checking.
const SNAPSHOT_VERSION: u16 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct BucketSnapshot {
    length: usize,
    inserts: u64,
    bits: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FilterSnapshot {
    version: u16,
    byte_order: ByteOrder,
    inserted: u64,
    buckets: Vec<BucketSnapshot>,
}

impl FilterSnapshot {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.version != SNAPSHOT_VERSION {
            return Err(format!(
                "unsupported snapshot version: expected {}, got {}",
                SNAPSHOT_VERSION, self.version
            ));
        }

        let mut seen = HashSet::with_capacity(self.buckets.len());
        for bucket in &self.buckets {
            if bucket.bits.len() != bucket.length {
                return Err(format!(
                    "bucket {} holds {} bytes",
                    bucket.length,
                    bucket.bits.len()
                ));
            }
            if !seen.insert(bucket.length) {
                return Err(format!("bucket {} appears twice", bucket.length));
            }
        }
        Ok(())
    }
}

impl<G: BucketGuard> Serialize for ShapeBloomFilter<G> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let buckets = self
            .bucket_snapshots()
            .into_iter()
            .map(|(length, inserts, bits)| BucketSnapshot {
                length,
                inserts,
                bits,
            })
            .collect();

        FilterSnapshot {
            version: SNAPSHOT_VERSION,
            byte_order: self.byte_order(),
            inserted: self.len(),
            buckets,
        }
        .serialize(serializer)
    }
}

impl<'de, G: BucketGuard> Deserialize<'de> for ShapeBloomFilter<G> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let snapshot = FilterSnapshot::deserialize(deserializer)?;
        snapshot.validate().map_err(D::Error::custom)?;

        let config = FilterConfig {
            byte_order: snapshot.byte_order,
            ..FilterConfig::default()
        };
        Ok(ShapeBloomFilter::restore(
            config,
            snapshot.inserted,
            snapshot
                .buckets
                .into_iter()
                .map(|b| (b.length, b.inserts, b.bits)),
        ))
    }
}

/// bincode and JSON helpers returning [`ShapeBloomError`].
pub struct FilterSerdeSupport;

impl FilterSerdeSupport {
    /// Serialize `filter` with bincode.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if bincode fails.
    pub fn to_bytes<G: BucketGuard>(filter: &ShapeBloomFilter<G>) -> Result<Vec<u8>> {
        bincode::serialize(filter).map_err(|e| {
            ShapeBloomError::serialization_error(format!("bincode serialization failed: {}", e))
        })
    }

    /// Restore a filter from bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if the bytes are malformed or fail
    /// snapshot validation.
    pub fn from_bytes<G: BucketGuard>(bytes: &[u8]) -> Result<ShapeBloomFilter<G>> {
        bincode::deserialize(bytes).map_err(|e| {
            ShapeBloomError::serialization_error(format!("bincode deserialization failed: {}", e))
        })
    }

    /// Serialize `filter` to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if JSON serialization fails.
    pub fn to_json<G: BucketGuard>(filter: &ShapeBloomFilter<G>) -> Result<String> {
        serde_json::to_string(filter).map_err(|e| {
            ShapeBloomError::serialization_error(format!("JSON serialization failed: {}", e))
        })
    }

    /// Restore a filter from JSON.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if the JSON is malformed or fails
    /// snapshot validation.
    pub fn from_json<G: BucketGuard>(json: &str) -> Result<ShapeBloomFilter<G>> {
        serde_json::from_str(json).map_err(|e| {
            ShapeBloomError::serialization_error(format!("JSON deserialization failed: {}", e))
        })
    }
}
