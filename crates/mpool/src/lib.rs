//! mpool: a fixed-arena memory pool with first-fit allocation.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! mpool sub-crates. For most users, adding `mpool` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use mpool::prelude::*;
//!
//! let mut pool = Pool::create(1024).unwrap();
//!
//! let a = pool.alloc(30).unwrap();
//! let b = pool.alloc(30).unwrap();
//! pool.bytes_mut(a).unwrap().copy_from_slice(&[1; 30]);
//!
//! pool.free(b).unwrap();
//! pool.free(a).unwrap();
//!
//! // Everything coalesced back into one range.
//! assert_eq!(pool.free_ranges().count(), 1);
//! pool.destroy().unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `mpool-arena` | `Pool`, ranges, config, stats, invariant audit |
//! | [`list`] | `mpool-list` | Generic doubly-linked list with stable node handles |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Pool allocation over a fixed arena (`mpool-arena`).
///
/// Start with [`arena::Pool`]; [`arena::PoolConfig`] controls the destroy
/// policy and per-operation invariant checks.
pub use mpool_arena as arena;

/// Doubly-linked list with stable node handles (`mpool-list`).
///
/// [`list::List`] is the container the pool keeps its ranges in. It is
/// usable on its own for any payload type.
pub use mpool_list as list;

/// Common imports for typical mpool usage.
///
/// ```rust
/// use mpool::prelude::*;
/// ```
pub mod prelude {
    // Pool
    pub use mpool_arena::{Address, Pool, Range};

    // Config and stats
    pub use mpool_arena::{DestroyPolicy, PoolConfig, PoolStats};

    // Errors
    pub use mpool_arena::{DestroyError, InvariantViolation, PoolError};

    // List
    pub use mpool_list::{IterOutcome, List, ListError, NodeId};
}
