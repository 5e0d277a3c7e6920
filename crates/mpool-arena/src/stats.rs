//! Pool occupancy and activity counters.
//!
//! [`PoolStats`] is a point-in-time snapshot: the gauges are recomputed from
//! the two lists on each [`Pool::stats`](crate::Pool::stats) call, the
//! counters are cumulative since the pool was created.

/// Occupancy gauges and cumulative activity counters for one pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Arena capacity in bytes.
    pub size: usize,
    /// Bytes covered by live allocations, alignment slack included.
    pub allocated_bytes: usize,
    /// Bytes callers actually requested across live allocations.
    pub requested_bytes: usize,
    /// Bytes covered by free ranges.
    pub free_bytes: usize,
    /// Number of live allocations.
    pub live_allocations: usize,
    /// Number of free ranges.
    pub free_ranges: usize,
    /// Length of the largest free range.
    pub largest_free: usize,
    /// Cumulative successful `alloc` calls.
    pub total_allocs: u64,
    /// Cumulative successful `free` calls.
    pub total_frees: u64,
    /// Cumulative `alloc` calls rejected (out of memory or zero-sized).
    pub failed_allocs: u64,
    /// Cumulative `free` calls rejected for an invalid address.
    pub invalid_frees: u64,
    /// Cumulative free-range merges performed while freeing.
    pub coalesces: u64,
}

impl PoolStats {
    /// Bytes lost to alignment slack inside live allocations.
    pub fn slack_bytes(&self) -> usize {
        self.allocated_bytes - self.requested_bytes
    }

    /// External fragmentation: the share of free bytes outside the largest
    /// free range, in `[0.0, 1.0]`. Zero when nothing is free.
    pub fn fragmentation(&self) -> f64 {
        if self.free_bytes == 0 {
            return 0.0;
        }
        1.0 - self.largest_free as f64 / self.free_bytes as f64
    }
}

/// Cumulative counters kept by the pool between snapshots.
#[derive(Clone, Debug, Default)]
pub(crate) struct Counters {
    pub(crate) allocs: u64,
    pub(crate) frees: u64,
    pub(crate) failed_allocs: u64,
    pub(crate) invalid_frees: u64,
    pub(crate) coalesces: u64,
}
