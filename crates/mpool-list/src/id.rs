//! Strongly-typed list and node identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ListId`] allocation.
static LIST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a [`List`](crate::List).
///
/// Allocated from a monotonic atomic counter, so two lists never share an
/// ID within a process. Every [`NodeId`] carries the ID of the list that
/// issued it, which is how a list rejects handles from another list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(u64);

impl ListId {
    /// Allocate a fresh, unique list ID. Thread-safe.
    pub(crate) fn next() -> Self {
        Self(LIST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a node inside a [`List`](crate::List).
///
/// A handle stays valid until its node is removed. The `generation` is
/// bumped every time a slot is vacated, so a handle to a removed node is
/// never confused with a later node that reuses the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) list: ListId,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// The list that issued this handle.
    pub fn list(&self) -> ListId {
        self.list
    }

    /// Slot index within the issuing list.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NodeId(list={}, idx={}, gen={})",
            self.list, self.index, self.generation
        )
    }
}
