//! Fixed-arena pool allocation for mpool.
//!
//! A [`Pool`] owns one contiguous arena and hands out aligned sub-ranges of
//! it without touching the system allocator per request. Bookkeeping is two
//! [`mpool_list::List`]s of [`Range`]s, one for live allocations and one for
//! free space, which together always cover the arena exactly once.
//!
//! # Architecture
//!
//! ```text
//! Pool
//! ├── Arena (Vec<u8>, reserved once, never resized)
//! ├── alloc list: List<Range>   (allocation order)
//! ├── free list:  List<Range>   (ascending offset, never adjacent)
//! ├── live index: IndexMap<offset, NodeId>
//! └── Counters → PoolStats
//! ```
//!
//! # Allocation policy
//!
//! - **Alignment:** 1 → 1, 2 → 2, 3–4 → 4, 5–8 → 8, larger → 16 bytes,
//!   relative to the arena base ([`align::alignment_for`]).
//! - **Search:** first fit in ascending offset order.
//! - **Carve:** from the high end of the chosen free range; alignment slack
//!   above the request is absorbed into the allocation.
//! - **Free:** ordered insert plus immediate merge with both neighbours.
//!
//! # Example
//!
//! ```rust
//! use mpool_arena::{Pool, PoolError};
//!
//! let mut pool = Pool::create(1024).unwrap();
//! let a = pool.alloc(100).unwrap();
//! pool.bytes_mut(a).unwrap().fill(7);
//! assert_eq!(a.offset_from(pool.base()).unwrap() % 16, 0);
//!
//! pool.free(a).unwrap();
//! assert!(matches!(pool.free(a), Err(PoolError::InvalidAddress { .. })));
//! pool.destroy().unwrap();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod align;
pub mod arena;
pub mod audit;
pub mod config;
pub mod error;
pub mod pool;
pub mod range;
pub mod stats;

// Public re-exports for the primary API surface.
pub use audit::InvariantViolation;
pub use config::{DestroyPolicy, PoolConfig};
pub use error::{DestroyError, PoolError};
pub use pool::Pool;
pub use range::{Address, Range};
pub use stats::PoolStats;
