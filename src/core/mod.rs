//! Core filter types.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── config.rs    - FilterConfig and defaults
//! ├── bucket.rs    - One length bucket and its statistics
//! ├── store.rs     - Sharded length → bucket map
//! ├── filter.rs    - ShapeBloomFilter (insert / query protocol)
//! └── mod.rs       - This file (public API)
//! ```
//!
//! # Data Model
//!
//! ```text
//! ShapeBloomFilter<G>
//! ├─ store: BucketStore<G>
//! │   └─ shards[i]: RwLock<HashMap<length, Arc<Bucket<G>>>>
//! │                              └─ Bucket { bits: G, inserts }
//! ├─ inserted: AtomicCounter     ← completed inserts
//! └─ pool: BufferPool            ← scratch buffers for encoding
//! ```
//!
//! Buckets are created on the first insert of their length and never
//! removed. Bits are only ever set, so a value once inserted is found by
//! every later query.

mod bucket;
mod config;
mod filter;
mod store;

pub use bucket::{Bucket, BucketStats};
pub use config::{FilterConfig, DEFAULT_POOL_CAPACITY, DEFAULT_SHARD_COUNT, MAX_SHARD_COUNT};
pub use filter::ShapeBloomFilter;
pub use store::BucketStore;
