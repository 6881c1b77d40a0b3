//! Internal utilities: padded atomic counters and the scratch buffer pool.
//!
//! # Modules
//!
//! - [`atomic`] - Cache-line padded counters
//! - [`pool`] - Reusable encode buffers with RAII return

pub mod atomic;
pub mod pool;

pub use atomic::{AtomicCounter, CacheLinePadded, CACHE_LINE_SIZE};
pub use pool::{BufferPool, PooledBuffer};
